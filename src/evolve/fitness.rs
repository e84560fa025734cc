//! Fitness distances: how far each metric sits from its requirement target.
//!
//! Two policies cover the criteria. Threshold criteria use
//! [`good_enough_distance`]: anything at or above the goal fully satisfies.
//! The wavelength match uses [`nearest_distance`]: the goal is a band to
//! hit, and overshooting is as wrong as undershooting.

use serde::{Deserialize, Serialize};

use crate::schema::Targets;

use super::metrics::{Metrics, NUM_CRITERIA};
use super::satellite::Satellite;

/// Proximity band half-width for the wavelength match criterion.
pub const WAVELENGTH_LEEWAY: f64 = 0.005;

/// Distances below this count as an exactly-satisfied criterion.
pub const ZERO_EPS: f64 = 1e-14;

/// Per-criterion distance vector; 0 is fully satisfied, ordering matches
/// [`Metrics::as_array`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    pub distances: [f64; NUM_CRITERIA],
}

impl Fitness {
    /// Total distance across all criteria.
    pub fn total(&self) -> f64 {
        self.distances.iter().sum()
    }

    /// Number of criteria satisfied to within [`ZERO_EPS`].
    pub fn near_zero_count(&self) -> usize {
        self.distances.iter().filter(|d| **d < ZERO_EPS).count()
    }
}

/// Threshold-exceedance distance: 0 once the metric meets the goal,
/// otherwise the linear shortfall clipped to [0, 1].
pub fn good_enough_distance(goal: f64, metric: f64) -> f64 {
    if metric >= goal {
        0.0
    } else {
        (goal - metric).clamp(0.0, 1.0)
    }
}

/// Proximity distance: a metric of ~0 means the capability is absent and
/// scores the full distance of 1; otherwise the gap to the goal outside the
/// leeway band, clipped to [0, 1].
pub fn nearest_distance(goal: f64, metric: f64, leeway: f64) -> f64 {
    if metric.abs() < ZERO_EPS {
        return 1.0;
    }
    ((goal - metric).abs() - leeway).clamp(0.0, 1.0)
}

/// Distance vector for one metric set against the targets.
///
/// Volume, mass, compute and power are held to full satisfaction; the link,
/// attitude and detail criteria chase the caller's goals; the wavelength
/// match is banded.
pub fn fitness_for(metrics: &Metrics, targets: &Targets) -> Fitness {
    Fitness {
        distances: [
            good_enough_distance(1.0, metrics.volume),
            good_enough_distance(1.0, metrics.mass),
            good_enough_distance(1.0, metrics.cpu),
            good_enough_distance(1.0, metrics.power),
            good_enough_distance(targets.down_link, metrics.down_link),
            good_enough_distance(targets.up_link, metrics.up_link),
            good_enough_distance(targets.att_moment, metrics.att_moment),
            good_enough_distance(targets.att_knowledge, metrics.att_knowledge),
            nearest_distance(targets.wavelength, metrics.wavelength, WAVELENGTH_LEEWAY),
            good_enough_distance(targets.detail, metrics.detail),
        ],
    }
}

/// A satellite reached the fitness pass without metrics.
#[derive(Debug, thiserror::Error)]
#[error("Satellite {0} has no metrics to score")]
pub struct UnscoredSatellite(pub u64);

/// Assign every population member its fitness vector.
pub fn calculate_fitness(
    population: &mut [Satellite],
    targets: &Targets,
) -> Result<(), UnscoredSatellite> {
    for satellite in population.iter_mut() {
        let metrics = satellite
            .metrics
            .as_ref()
            .ok_or(UnscoredSatellite(satellite.id))?;
        satellite.fitness = Some(fitness_for(metrics, targets));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolve::metrics::calculate_satellite_metrics;
    use crate::evolve::satellite::Encoder;
    use crate::evolve::testutil::{test_catalog, test_targets};
    use proptest::prelude::*;

    #[test]
    fn test_good_enough_threshold() {
        assert_eq!(good_enough_distance(0.5, 0.5), 0.0);
        assert_eq!(good_enough_distance(0.5, 0.9), 0.0);
        assert!((good_enough_distance(0.5, 0.4) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_distance_band() {
        assert_eq!(nearest_distance(0.5, 0.0, 0.005), 1.0);
        assert_eq!(nearest_distance(0.5, 0.5, 0.005), 0.0);
        assert_eq!(nearest_distance(0.5, 0.503, 0.005), 0.0);
        assert!((nearest_distance(0.5, 0.6, 0.005) - 0.095).abs() < 1e-12);
        // Overshoot is penalized just like undershoot.
        assert_eq!(
            nearest_distance(0.5, 0.7, 0.005),
            nearest_distance(0.5, 0.3, 0.005)
        );
    }

    #[test]
    fn test_fitness_vector_wiring() {
        let catalog = test_catalog();
        let targets = test_targets();
        let mut encoder = Encoder::new(&catalog, 10, Some(31)).unwrap();
        let mut population = encoder.create_population(5);

        for satellite in &mut population {
            calculate_satellite_metrics(satellite, &catalog, targets.battery_required).unwrap();
        }
        calculate_fitness(&mut population, &targets).unwrap();

        for satellite in &population {
            let fitness = satellite.fitness.expect("fitness populated");
            for distance in fitness.distances {
                assert!((0.0..=1.0).contains(&distance));
            }
            assert!(fitness.total() <= NUM_CRITERIA as f64);
        }
    }

    #[test]
    fn test_unscored_satellite_is_an_error() {
        let catalog = test_catalog();
        let mut encoder = Encoder::new(&catalog, 10, Some(32)).unwrap();
        let mut population = encoder.create_population(2);

        let err = calculate_fitness(&mut population, &test_targets()).unwrap_err();
        assert_eq!(err.0, population[0].id);
    }

    proptest! {
        #[test]
        fn prop_good_enough_nonnegative_and_monotone(
            goal in 0.0..=1.0f64,
            lo in 0.0..=1.0f64,
            hi in 0.0..=1.0f64,
        ) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let d_lo = good_enough_distance(goal, lo);
            let d_hi = good_enough_distance(goal, hi);
            prop_assert!(d_lo >= 0.0 && d_lo <= 1.0);
            // Non-increasing as the metric improves.
            prop_assert!(d_hi <= d_lo);
        }

        #[test]
        fn prop_nearest_zero_inside_leeway(
            goal in 0.1..=1.0f64,
            offset in -0.005..=0.005f64,
        ) {
            let metric = (goal + offset).clamp(1e-3, 1.0);
            if (goal - metric).abs() <= 0.005 {
                prop_assert_eq!(nearest_distance(goal, metric, 0.005), 0.0);
            }
        }

        #[test]
        fn prop_nearest_bounded(goal in 0.0..=1.0f64, metric in 0.0..=1.0f64) {
            let d = nearest_distance(goal, metric, 0.005);
            prop_assert!((0.0..=1.0).contains(&d));
        }
    }
}
