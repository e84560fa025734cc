//! Survivor ranking over a combined parent+child pool.
//!
//! Ranks are handed out in three waves:
//!
//! 1. The satellite with the globally smallest total distance takes rank 0.
//! 2. Each criterion in index order crowns a champion - the unranked
//!    satellite with the smallest distance on that criterion - so every
//!    objective keeps a representative near the top of the order.
//! 3. Everyone left is grouped by descending count of exactly-satisfied
//!    criteria, each group ordered by ascending total distance.
//!
//! Ties break on the lowest pool index, so a ranking pass is fully
//! deterministic. Because champions are only drawn from the unranked
//! remainder, the result is a duplicate-free permutation of `0..N-1` for
//! any population size, including pools smaller than the elite seat count.

use super::fitness::UnscoredSatellite;
use super::metrics::NUM_CRITERIA;
use super::satellite::Satellite;

/// Ranking precondition failures.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    #[error("Cannot rank an empty population")]
    EmptyPopulation,
    #[error(transparent)]
    Unscored(#[from] UnscoredSatellite),
}

/// Assign a rank to every satellite in the pool.
///
/// Returns the maximum count of exactly-satisfied criteria observed, as a
/// convergence diagnostic.
pub fn calculate_rankings(population: &mut [Satellite]) -> Result<usize, RankError> {
    if population.is_empty() {
        return Err(RankError::EmptyPopulation);
    }

    let scored: Vec<Scored> = population
        .iter()
        .enumerate()
        .map(|(idx, satellite)| {
            let fitness = satellite
                .fitness
                .as_ref()
                .ok_or(UnscoredSatellite(satellite.id))?;
            Ok(Scored {
                idx,
                total: fitness.total(),
                zeros: fitness.near_zero_count(),
                distances: fitness.distances,
            })
        })
        .collect::<Result<_, UnscoredSatellite>>()?;

    let max_zeros = scored.iter().map(|s| s.zeros).max().unwrap_or(0);

    let mut ranked = vec![false; scored.len()];
    let mut next_rank = 0usize;

    // Wave 1: global elitism seed.
    if let Some(idx) = unranked_argmin(&scored, &ranked, |s| s.total) {
        population[idx].rank = Some(next_rank);
        ranked[idx] = true;
        next_rank += 1;
    }

    // Wave 2: one champion per criterion, drawn from the unranked rest.
    for criterion in 0..NUM_CRITERIA {
        // Pool exhausted by the elite waves.
        let Some(idx) = unranked_argmin(&scored, &ranked, |s| s.distances[criterion]) else {
            break;
        };
        population[idx].rank = Some(next_rank);
        ranked[idx] = true;
        next_rank += 1;
    }

    // Wave 3: zero-count tiers, best totals first within each tier.
    let mut rest: Vec<&Scored> = scored.iter().filter(|s| !ranked[s.idx]).collect();
    rest.sort_by(|a, b| {
        b.zeros
            .cmp(&a.zeros)
            .then(a.total.total_cmp(&b.total))
            .then(a.idx.cmp(&b.idx))
    });
    for entry in rest {
        population[entry.idx].rank = Some(next_rank);
        next_rank += 1;
    }

    Ok(max_zeros)
}

/// One pool member's scores, cached for the ranking waves.
struct Scored {
    idx: usize,
    total: f64,
    zeros: usize,
    distances: [f64; NUM_CRITERIA],
}

/// Pool index of the first unranked entry minimizing `key`, if any remain.
fn unranked_argmin<F>(scored: &[Scored], ranked: &[bool], key: F) -> Option<usize>
where
    F: Fn(&Scored) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for entry in scored.iter().filter(|s| !ranked[s.idx]) {
        let value = key(entry);
        match best {
            Some((_, current)) if value >= current => {}
            _ => best = Some((entry.idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolve::fitness::calculate_fitness;
    use crate::evolve::metrics::calculate_satellite_metrics;
    use crate::evolve::satellite::Encoder;
    use crate::evolve::testutil::{scored_population, test_catalog, test_targets};

    #[test]
    fn test_empty_population_rejected() {
        let mut empty: Vec<Satellite> = Vec::new();
        assert!(matches!(
            calculate_rankings(&mut empty),
            Err(RankError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_ranks_form_a_permutation() {
        for size in [3, 10, 11, 30] {
            let mut population = scored_population(size, 41);
            calculate_rankings(&mut population).unwrap();

            let mut ranks: Vec<usize> = population.iter().map(|s| s.rank.unwrap()).collect();
            ranks.sort_unstable();
            let expected: Vec<usize> = (0..size).collect();
            assert_eq!(ranks, expected, "size {size}");
        }
    }

    #[test]
    fn test_rank_zero_is_global_minimum() {
        let mut population = scored_population(24, 43);
        calculate_rankings(&mut population).unwrap();

        let best_total = population
            .iter()
            .map(|s| s.fitness.unwrap().total())
            .fold(f64::INFINITY, f64::min);
        let rank_zero = population
            .iter()
            .find(|s| s.rank == Some(0))
            .expect("rank 0 assigned");
        assert!((rank_zero.fitness.unwrap().total() - best_total).abs() < 1e-12);
    }

    #[test]
    fn test_criterion_champions_outrank_the_field() {
        let mut population = scored_population(30, 47);
        calculate_rankings(&mut population).unwrap();

        // Every criterion's overall minimum holder must sit within the
        // elite seats (rank 0 holder may absorb several championships).
        for criterion in 0..NUM_CRITERIA {
            let best = population
                .iter()
                .map(|s| s.fitness.unwrap().distances[criterion])
                .fold(f64::INFINITY, f64::min);
            let holder_rank = population
                .iter()
                .filter(|s| (s.fitness.unwrap().distances[criterion] - best).abs() < 1e-15)
                .map(|s| s.rank.unwrap())
                .min()
                .unwrap();
            assert!(holder_rank <= NUM_CRITERIA, "criterion {criterion}");
        }
    }

    #[test]
    fn test_unscored_pool_is_an_error() {
        let catalog = test_catalog();
        let mut encoder = Encoder::new(&catalog, 10, Some(53)).unwrap();
        let mut population = encoder.create_population(4);
        for satellite in &mut population {
            calculate_satellite_metrics(satellite, &catalog, false).unwrap();
        }
        calculate_fitness(&mut population, &test_targets()).unwrap();
        population[2].fitness = None;

        assert!(matches!(
            calculate_rankings(&mut population),
            Err(RankError::Unscored(_))
        ));
    }

    #[test]
    fn test_max_zero_count_reported() {
        let mut population = scored_population(20, 59);
        let reported = calculate_rankings(&mut population).unwrap();
        let actual = population
            .iter()
            .map(|s| s.fitness.unwrap().near_zero_count())
            .max()
            .unwrap();
        assert_eq!(reported, actual);
    }
}
