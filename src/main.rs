//! CubeSat design search CLI - run the optimizer from a JSON run file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use cubesat_evolve::{
    evolve::{diagnostics_csv, population_report, save_outcome, sort_by_rank, EvolutionEngine},
    schema::{Catalog, ComponentRecord, PanelRecord, RunConfig, StructureRecord, Targets},
};

/// Everything one run needs, in a single JSON file.
#[derive(Debug, Serialize, Deserialize)]
struct RunFile {
    catalog: Catalog,
    #[serde(default)]
    run: RunConfig,
    targets: Targets,
    /// Where to save the outcome. Prints to stdout when absent.
    #[serde(default)]
    output_dir: Option<PathBuf>,
    /// File name stem for saved artifacts.
    #[serde(default = "default_name")]
    name: String,
}

fn default_name() -> String {
    "run".into()
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <run.json>", args[0]);
        eprintln!();
        eprintln!("Evolve CubeSat configurations against the requirements in a run file.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json  Catalog, run parameters and targets in one JSON file");
        eprintln!();
        eprintln!("A template run file is generated with --example.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_run_file();
        return;
    }

    let run_path = PathBuf::from(&args[1]);
    let run_str = fs::read_to_string(&run_path).unwrap_or_else(|e| {
        eprintln!("Error reading run file: {}", e);
        std::process::exit(1);
    });
    let run_file: RunFile = serde_json::from_str(&run_str).unwrap_or_else(|e| {
        eprintln!("Error parsing run file: {}", e);
        std::process::exit(1);
    });

    println!("CubeSat Configuration Search");
    println!("============================");
    println!(
        "Catalog: {} structures, {} components, {} panels",
        run_file.catalog.structures.len(),
        run_file.catalog.components.len(),
        run_file.catalog.side_panels.len() + run_file.catalog.end_panels.len()
    );
    println!(
        "Generations: {}, population: {}, mutation rate: {}",
        run_file.run.generations, run_file.run.population_size, run_file.run.mutation_rate
    );
    println!();

    let mut engine =
        EvolutionEngine::new(&run_file.catalog, run_file.run, run_file.targets).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    println!("Running search...");
    let start = Instant::now();
    let mut outcome = engine.run().unwrap_or_else(|e| {
        eprintln!("Error during search: {}", e);
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    sort_by_rank(&mut outcome.population);

    if let Some(last) = outcome.history.last() {
        println!(
            "Final generation: min distance {:.4}, mean {:.4}, satisfied criteria {}",
            last.min_distance, last.mean_distance, last.max_zero_count
        );
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!();

    match &run_file.output_dir {
        Some(dir) => {
            let written = save_outcome(dir, &run_file.name, &outcome).unwrap_or_else(|e| {
                eprintln!("Error saving outcome: {}", e);
                std::process::exit(1);
            });
            for path in written {
                println!("Wrote {}", path.display());
            }
        }
        None => {
            println!("{}", population_report(&outcome.population));
            println!("{}", diagnostics_csv(&outcome.history));
        }
    }
}

fn print_example_run_file() {
    let run_file = RunFile {
        catalog: example_catalog(),
        run: RunConfig {
            generations: 100,
            population_size: 100,
            mutation_rate: 0.3,
            random_seed: Some(42),
            ..Default::default()
        },
        targets: Targets {
            down_link: 0.334,
            up_link: 0.167,
            att_moment: 0.2667,
            att_knowledge: 0.167,
            wavelength: 0.5,
            detail: 0.5,
            battery_required: false,
        },
        output_dir: None,
        name: default_name(),
    };

    println!("Example run file (run.json):");
    match serde_json::to_string_pretty(&run_file) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => eprintln!("Error rendering example: {}", e),
    }
}

/// A small catalog to start experimenting with; real runs load a full
/// parts database.
fn example_catalog() -> Catalog {
    let part = |name: &str| ComponentRecord {
        name: name.into(),
        x: 90.0,
        y: 90.0,
        z: 20.0,
        mass: 0.1,
        internal_slots: 1.0,
        external_slots: 0.0,
        power_nominal: -0.2,
        power_peak: -0.5,
        min_wavelength: 0.0,
        max_wavelength: 0.0,
        detail: 0.0,
        bitrate_down: None,
        bitrate_up: None,
        data_storage: 0.0,
        code_storage: 0.0,
        ram: 0.0,
        att_knowledge: None,
        att_moment: 0.0,
        discharge_time: 0.0,
        price: 1000.0,
        duplex: false,
    };

    Catalog {
        structures: vec![
            StructureRecord {
                name: "1U Frame".into(),
                x: 100.0,
                y: 100.0,
                z: 100.0,
                mass: 0.2,
                internal_slots: 4.0,
                external_slots: 2.0,
                size_class: 1.0,
                price: 1500.0,
            },
            StructureRecord {
                name: "3U Frame".into(),
                x: 100.0,
                y: 100.0,
                z: 300.0,
                mass: 0.5,
                internal_slots: 12.0,
                external_slots: 6.0,
                size_class: 3.0,
                price: 3800.0,
            },
        ],
        components: vec![
            ComponentRecord {
                power_nominal: -0.4,
                power_peak: -2.0,
                bitrate_down: Some(9600.0),
                bitrate_up: Some(1200.0),
                duplex: true,
                ..part("UHF Transceiver")
            },
            ComponentRecord {
                data_storage: 512.0,
                code_storage: 32.0,
                ram: 64.0,
                ..part("Flight Computer")
            },
            ComponentRecord {
                mass: 0.3,
                min_wavelength: 400.0,
                max_wavelength: 700.0,
                detail: 0.667,
                ..part("Visible Imager")
            },
            ComponentRecord {
                internal_slots: 0.5,
                att_knowledge: Some(0.05),
                ..part("Star Tracker")
            },
            ComponentRecord {
                mass: 0.2,
                att_moment: 0.8,
                ..part("Reaction Wheel")
            },
            ComponentRecord {
                mass: 0.25,
                discharge_time: 2.5,
                ..part("Battery Pack")
            },
        ],
        side_panels: vec![PanelRecord {
            name: "Side Cell".into(),
            mass: 0.05,
            power: 2.1,
            price: 900.0,
        }],
        end_panels: vec![PanelRecord {
            name: "End Cell".into(),
            mass: 0.04,
            power: 1.8,
            price: 700.0,
        }],
    }
}
