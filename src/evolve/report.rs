//! Reporting and persistence for finished runs.
//!
//! Produces the two consumable views of an outcome: a human-readable
//! per-satellite dump and a CSV table of the per-generation diagnostics,
//! plus JSON save/load of populations for later inspection.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::engine::{EvolutionOutcome, GenerationStats};
use super::satellite::Satellite;

/// Report persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Sort a population by ascending rank for presentation. Unranked
/// satellites sink to the end.
pub fn sort_by_rank(population: &mut [Satellite]) {
    population.sort_by_key(|s| s.rank.unwrap_or(usize::MAX));
}

/// Human-readable dump of every satellite in the population.
pub fn population_report(population: &[Satellite]) -> String {
    let mut out = String::new();
    for satellite in population {
        match satellite.rank {
            Some(rank) => {
                let _ = writeln!(out, "satellite {} (rank {})", satellite.id, rank);
            }
            None => {
                let _ = writeln!(out, "satellite {} (unranked)", satellite.id);
            }
        }
        let _ = writeln!(out, "  structure: {}", satellite.structure);
        let _ = writeln!(
            out,
            "  panels: {} / {}",
            satellite.panels.side, satellite.panels.end
        );
        let _ = writeln!(out, "  components: {}", satellite.components.join(", "));
        let _ = writeln!(
            out,
            "  slots: internal {:.2}/{:.2} free, external {:.2}/{:.2} free",
            satellite.slots.internal_remaining,
            satellite.slots.internal_budget,
            satellite.slots.external_remaining,
            satellite.slots.external_budget,
        );
        if let Some(metrics) = &satellite.metrics {
            let rendered: Vec<String> = metrics
                .as_array()
                .iter()
                .map(|m| format!("{m:.3}"))
                .collect();
            let _ = writeln!(out, "  metrics: [{}]", rendered.join(", "));
        }
        if let Some(fitness) = &satellite.fitness {
            let _ = writeln!(
                out,
                "  fitness: total {:.4}, satisfied criteria {}",
                fitness.total(),
                fitness.near_zero_count()
            );
        }
        let _ = writeln!(out);
    }
    out
}

/// CSV table of the per-generation diagnostics.
pub fn diagnostics_csv(history: &[GenerationStats]) -> String {
    let mut out = String::from("generation,max_zero_count,mean_distance,min_distance\n");
    for stats in history {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            stats.generation, stats.max_zero_count, stats.mean_distance, stats.min_distance
        );
    }
    out
}

/// Write an outcome to disk: `<name>_population.json`, `<name>_report.txt`
/// and `<name>_performance.csv` under `dir`.
pub fn save_outcome(
    dir: &Path,
    name: &str,
    outcome: &EvolutionOutcome,
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir)?;

    let population_path = dir.join(format!("{name}_population.json"));
    fs::write(
        &population_path,
        serde_json::to_string_pretty(&outcome.population)?,
    )?;

    let report_path = dir.join(format!("{name}_report.txt"));
    fs::write(&report_path, population_report(&outcome.population))?;

    let csv_path = dir.join(format!("{name}_performance.csv"));
    fs::write(&csv_path, diagnostics_csv(&outcome.history))?;

    Ok(vec![population_path, report_path, csv_path])
}

/// Load a previously saved population.
pub fn load_population(path: &Path) -> Result<Vec<Satellite>, ReportError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolve::testutil::scored_population;
    use crate::evolve::ranking::calculate_rankings;

    #[test]
    fn test_report_lists_every_satellite() {
        let mut population = scored_population(6, 83);
        calculate_rankings(&mut population).unwrap();
        sort_by_rank(&mut population);

        let report = population_report(&population);
        for satellite in &population {
            assert!(report.contains(&format!("satellite {}", satellite.id)));
            assert!(report.contains(&satellite.structure));
        }
        assert!(report.contains("(rank 0)"));
    }

    #[test]
    fn test_sort_by_rank_orders_ascending() {
        let mut population = scored_population(8, 89);
        calculate_rankings(&mut population).unwrap();
        sort_by_rank(&mut population);

        let ranks: Vec<usize> = population.iter().map(|s| s.rank.unwrap()).collect();
        assert_eq!(ranks, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_csv_shape() {
        let history = vec![
            GenerationStats {
                generation: 0,
                max_zero_count: 2,
                mean_distance: 1.5,
                min_distance: 0.75,
            },
            GenerationStats {
                generation: 1,
                max_zero_count: 3,
                mean_distance: 1.2,
                min_distance: 0.5,
            },
        ];
        let csv = diagnostics_csv(&history);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "generation,max_zero_count,mean_distance,min_distance");
        assert_eq!(lines[1], "0,2,1.5,0.75");
    }

    #[test]
    fn test_save_and_reload_population() {
        let mut population = scored_population(5, 97);
        calculate_rankings(&mut population).unwrap();
        let outcome = EvolutionOutcome {
            population,
            history: vec![GenerationStats {
                generation: 0,
                max_zero_count: 1,
                mean_distance: 2.0,
                min_distance: 1.0,
            }],
        };

        let dir = tempfile::tempdir().unwrap();
        let written = save_outcome(dir.path(), "trial", &outcome).unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists());
        }

        let reloaded = load_population(&written[0]).unwrap();
        assert_eq!(reloaded.len(), outcome.population.len());
        for (a, b) in reloaded.iter().zip(outcome.population.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.components, b.components);
            assert_eq!(a.rank, b.rank);
        }
    }
}
