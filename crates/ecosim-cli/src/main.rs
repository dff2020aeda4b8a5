//! EcoSim Headless Runner
//!
//! Loads a JSON config (or the built-in meadow), runs a number of epochs
//! and prints the population counts after each one.
//!
//! Usage:
//!   cargo run -p ecosim-cli -- --config meadow.json --epochs 20
//!   cargo run -p ecosim-cli -- --epochs 5 --save run.bin
//!   cargo run -p ecosim-cli -- --resume run.bin --epochs 5 --json

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ecosim_core::prelude::*;

#[derive(Parser)]
#[command(name = "ecosim")]
#[command(version)]
#[command(about = "Predator-prey ecosystem simulation")]
struct Cli {
    /// Configuration file (JSON); the built-in meadow when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of epochs to run
    #[arg(short, long, default_value = "10")]
    epochs: u32,

    /// Random seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Write a checkpoint here after the last epoch
    #[arg(long)]
    save: Option<PathBuf>,

    /// Continue from a checkpoint instead of a config
    #[arg(long, conflicts_with_all = ["config", "seed"])]
    resume: Option<PathBuf>,

    /// One JSON report per line instead of text
    #[arg(long)]
    json: bool,

    /// Debug logging (neighbour refreshes)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut sim = match &cli.resume {
        Some(path) => resume(path)?,
        None => create(cli.config.as_deref(), cli.seed)?,
    };

    print_report(&sim.report(), cli.json)?;
    for _ in 0..cli.epochs {
        let report = sim
            .run_epoch()
            .with_context(|| format!("epoch {} failed", sim.epoch() + 1))?;
        print_report(&report, cli.json)?;
    }

    if let Some(path) = &cli.save {
        let file = File::create(path)
            .with_context(|| format!("cannot create checkpoint {}", path.display()))?;
        sim.save(BufWriter::new(file))
            .with_context(|| format!("cannot save checkpoint {}", path.display()))?;
        log::info!("Saved epoch {} to {}", sim.epoch(), path.display());
    }

    Ok(())
}

fn create(config_path: Option<&Path>, seed: Option<u64>) -> Result<Simulation> {
    let mut config = match config_path {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => {
            log::info!("Using default configuration");
            SimulationConfig::default()
        }
    };
    if seed.is_some() {
        config.seed = seed;
    }
    Simulation::new(config).context("cannot build simulation")
}

fn resume(path: &Path) -> Result<Simulation> {
    let file = File::open(path)
        .with_context(|| format!("cannot open checkpoint {}", path.display()))?;
    Simulation::load(BufReader::new(file))
        .with_context(|| format!("cannot load checkpoint {}", path.display()))
}

fn print_report(report: &EpochReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
