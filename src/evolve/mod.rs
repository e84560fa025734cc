//! Evolutionary search over CubeSat component configurations.
//!
//! # Overview
//!
//! The optimizer consists of:
//!
//! - **Satellite encoding** (`satellite`): design records and the slot-budget
//!   constrained construction, crossover and mutation operators
//! - **Metric evaluation** (`metrics`): raw physical aggregation and the
//!   normalization functions onto the `[0, 1]` scale
//! - **Fitness distances** (`fitness`): per-criterion distances against the
//!   requirement targets
//! - **Ranking** (`ranking`): elitist multi-criterion survivor ordering
//! - **Generational loop** (`engine`): the batch optimizer itself
//! - **Reporting** (`report`): population dumps, diagnostics CSV, persistence
//!
//! # Example
//!
//! ```rust,no_run
//! use cubesat_evolve::schema::{Catalog, RunConfig, Targets};
//! use cubesat_evolve::evolve::EvolutionEngine;
//!
//! # fn demo(catalog: Catalog, targets: Targets) -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig {
//!     generations: 50,
//!     population_size: 40,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(&catalog, config, targets)?;
//! let outcome = engine.run()?;
//!
//! println!(
//!     "best total distance: {:.4}",
//!     outcome.history.last().map(|s| s.min_distance).unwrap_or(f64::NAN)
//! );
//! # Ok(())
//! # }
//! ```

mod engine;
mod fitness;
mod metrics;
mod ranking;
mod report;
mod satellite;

pub use engine::{EngineError, EvolutionEngine, EvolutionOutcome, GenerationStats};
pub use fitness::{
    calculate_fitness, fitness_for, good_enough_distance, nearest_distance, Fitness,
    UnscoredSatellite, WAVELENGTH_LEEWAY, ZERO_EPS,
};
pub use metrics::{
    att_know_metric, att_moment_metric, bitrate_metric, calculate_satellite_metrics,
    combine_sections, combine_values, cpu_metric, mass_metric, parse_component, power_metric,
    volume_metric, wavelength_metric, Metrics, RawProfile, NUM_CRITERIA,
};
pub use ranking::{calculate_rankings, RankError};
pub use report::{
    diagnostics_csv, load_population, population_report, save_outcome, sort_by_rank, ReportError,
};
pub use satellite::{Encoder, PanelPair, Satellite, SlotState};
