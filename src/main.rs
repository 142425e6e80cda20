//! Connectivity controller entry point: CLI wiring and scenario replay.

mod cli;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use connectivity_ctl::config::ScenarioConfig;
use connectivity_ctl::io::export::export_csv;
use connectivity_ctl::sim::replay::Replay;

use cli::CliArgs;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = CliArgs::parse();

    // --scenario takes priority, then --preset, then the storymode default
    let loaded = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::baseline())
    };
    let mut scenario = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(end) = cli.end {
        scenario.simulation.end = end;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let records = match Replay::new(&scenario).run() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    for r in &records {
        println!("{r}");
    }

    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&records, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {}", path.display());
    }
}
