//! The generational loop driving the whole search.
//!
//! One generation: breed a child population, mutate some children, merge
//! parents and children into a combined pool, evaluate metrics and fitness
//! for every pool member, rank the pool, and keep the lowest-ranked half as
//! the next generation. The loop runs for a fixed generation budget; a
//! caller wanting earlier termination checks between generations on its own
//! side.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::schema::{Catalog, CatalogError, ConfigError, RunConfig, Targets, MIN_POPULATION};

use super::fitness::{calculate_fitness, UnscoredSatellite};
use super::metrics::calculate_satellite_metrics;
use super::ranking::{calculate_rankings, RankError};
use super::satellite::{Encoder, Satellite};

/// Per-generation convergence diagnostics, computed over the survivor pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index, starting at 0.
    pub generation: usize,
    /// Highest count of exactly-satisfied criteria seen in the ranked pool.
    pub max_zero_count: usize,
    /// Mean total distance across survivors.
    pub mean_distance: f64,
    /// Smallest total distance across survivors.
    pub min_distance: f64,
}

/// Final product of a run: the surviving population and the full
/// generation-by-generation diagnostic history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionOutcome {
    pub population: Vec<Satellite>,
    pub history: Vec<GenerationStats>,
}

/// Anything that can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fitness(#[from] UnscoredSatellite),
    #[error(transparent)]
    Rank(#[from] RankError),
}

/// Owns one optimization run over a borrowed catalog.
pub struct EvolutionEngine<'a> {
    catalog: &'a Catalog,
    config: RunConfig,
    targets: Targets,
    population_size: usize,
}

impl<'a> EvolutionEngine<'a> {
    /// Validate everything up front and fix the effective population size.
    pub fn new(
        catalog: &'a Catalog,
        config: RunConfig,
        targets: Targets,
    ) -> Result<Self, EngineError> {
        catalog.validate()?;
        config.validate()?;
        targets.validate()?;

        let population_size = if config.population_size < MIN_POPULATION {
            warn!(
                "Population size {} below the floor, clamping to {}",
                config.population_size, MIN_POPULATION
            );
            MIN_POPULATION
        } else {
            config.population_size
        };

        Ok(Self {
            catalog,
            config,
            targets,
            population_size,
        })
    }

    /// Effective survivor pool size after clamping.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Run the full generation budget and return the outcome.
    pub fn run(&mut self) -> Result<EvolutionOutcome, EngineError> {
        let mut encoder = Encoder::new(
            self.catalog,
            self.config.fill_retries,
            self.config.random_seed,
        )?;

        let mut population = encoder.create_population(self.population_size);
        let mut history = Vec::with_capacity(self.config.generations);

        for generation in 0..self.config.generations {
            let mut children = encoder.create_child_population(&population)?;
            for child in &mut children {
                if encoder.chance(self.config.mutation_rate) {
                    encoder.mutate(child, self.config.structure_mutation_rate)?;
                }
            }

            // Combined pool: parents plus children, twice the survivor size.
            let mut pool = population;
            pool.append(&mut children);

            for satellite in &mut pool {
                if satellite.metrics.is_none() {
                    calculate_satellite_metrics(
                        satellite,
                        self.catalog,
                        self.targets.battery_required,
                    )?;
                }
            }
            calculate_fitness(&mut pool, &self.targets)?;

            let max_zero_count = calculate_rankings(&mut pool)?;

            pool.sort_by_key(|s| s.rank.unwrap_or(usize::MAX));
            pool.truncate(self.population_size);

            let stats = survivor_stats(generation, max_zero_count, &pool);
            info!(
                "Generation {}: min distance {:.4}, mean {:.4}, satisfied criteria {}",
                stats.generation, stats.min_distance, stats.mean_distance, stats.max_zero_count
            );
            history.push(stats);

            population = pool;
        }

        Ok(EvolutionOutcome {
            population,
            history,
        })
    }
}

fn survivor_stats(
    generation: usize,
    max_zero_count: usize,
    survivors: &[Satellite],
) -> GenerationStats {
    let totals: Vec<f64> = survivors
        .iter()
        .filter_map(|s| s.fitness.as_ref().map(|f| f.total()))
        .collect();
    let min_distance = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let mean_distance = if totals.is_empty() {
        0.0
    } else {
        totals.iter().sum::<f64>() / totals.len() as f64
    };

    GenerationStats {
        generation,
        max_zero_count,
        mean_distance,
        min_distance,
    }
}
