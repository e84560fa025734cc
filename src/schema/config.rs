//! Run configuration and requirement targets for the evolutionary search.

use serde::{Deserialize, Serialize};

/// Smallest population the generational loop will run with. Requests below
/// this are clamped; the ranking scheme hands out eleven elite seats per
/// generation and needs headroom beyond them.
pub const MIN_POPULATION: usize = 15;

/// Knobs for one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of generations to evolve.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Survivor pool size per generation (clamped to [`MIN_POPULATION`]).
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Probability that a freshly bred child is mutated.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Within a mutation, probability of swapping the structure instead of
    /// adding a component to the pool.
    #[serde(default = "default_structure_mutation_rate")]
    pub structure_mutation_rate: f64,
    /// Anti-stall budget for the slot fill loop: consecutive attempts
    /// allowed while the remaining internal slot count sits in (0, 1) or a
    /// drawn part fails to fit. Heuristic, not a physical constraint.
    #[serde(default = "default_fill_retries")]
    pub fill_retries: u32,
    /// RNG seed for reproducible runs. Entropy-seeded when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            structure_mutation_rate: default_structure_mutation_rate(),
            fill_retries: default_fill_retries(),
            random_seed: None,
        }
    }
}

fn default_generations() -> usize {
    100
}
fn default_population_size() -> usize {
    100
}
fn default_mutation_rate() -> f64 {
    0.3
}
fn default_structure_mutation_rate() -> f64 {
    0.1
}
fn default_fill_retries() -> u32 {
    10
}

impl RunConfig {
    /// Check the configuration is runnable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generations == 0 {
            return Err(ConfigError::NoGenerations);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::RateOutOfRange("mutation_rate"));
        }
        if !(0.0..=1.0).contains(&self.structure_mutation_rate) {
            return Err(ConfigError::RateOutOfRange("structure_mutation_rate"));
        }
        if self.fill_retries == 0 {
            return Err(ConfigError::NoFillRetries);
        }
        Ok(())
    }
}

/// Customer requirement goals, one per steered criterion, already mapped
/// onto the fuzzy `[0, 1]` scale. Volume, mass, compute and power goals are
/// fixed at full satisfaction and are not configurable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Targets {
    /// Down-link speed goal.
    pub down_link: f64,
    /// Up-link speed goal.
    pub up_link: f64,
    /// Attitude control moment goal.
    pub att_moment: f64,
    /// Attitude knowledge goal.
    pub att_knowledge: f64,
    /// Observed wavelength band goal (matched within a leeway, not
    /// threshold-exceeded).
    pub wavelength: f64,
    /// Sensing detail goal.
    pub detail: f64,
    /// Whether mission rules require an on-board battery.
    #[serde(default)]
    pub battery_required: bool,
}

impl Targets {
    /// Check every goal sits on the fuzzy scale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("down_link", self.down_link),
            ("up_link", self.up_link),
            ("att_moment", self.att_moment),
            ("att_knowledge", self.att_knowledge),
            ("wavelength", self.wavelength),
            ("detail", self.detail),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::TargetOutOfRange(name));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Generation count must be non-zero")]
    NoGenerations,
    #[error("{0} must lie in [0, 1]")]
    RateOutOfRange(&'static str),
    #[error("Fill retry budget must be non-zero")]
    NoFillRetries,
    #[error("Target '{0}' must lie in [0, 1]")]
    TargetOutOfRange(&'static str),
}
