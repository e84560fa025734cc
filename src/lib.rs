//! CubeSat configuration search - multi-objective evolutionary design.
//!
//! This crate explores a design space of small-satellite configurations,
//! evolving combinations of off-the-shelf structures, components and solar
//! panels toward fuzzy, multi-objective customer requirements.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: the component catalog, run configuration and requirement
//!   targets
//! - `evolve`: the optimizer (encoding, metrics, fitness, ranking, the
//!   generational loop, and reporting)
//!
//! # Example
//!
//! ```rust,no_run
//! use cubesat_evolve::{
//!     evolve::{population_report, EvolutionEngine},
//!     schema::{Catalog, RunConfig, Targets},
//! };
//!
//! # fn demo(catalog: Catalog, targets: Targets) -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig {
//!     generations: 100,
//!     population_size: 100,
//!     mutation_rate: 0.3,
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = EvolutionEngine::new(&catalog, config, targets)?;
//! let outcome = engine.run()?;
//!
//! println!("{}", population_report(&outcome.population));
//! # Ok(())
//! # }
//! ```

pub mod evolve;
pub mod schema;

// Re-export commonly used types
pub use evolve::{EvolutionEngine, EvolutionOutcome, GenerationStats, Satellite};
pub use schema::{Catalog, RunConfig, Targets};
