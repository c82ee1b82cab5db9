//! Cluster-pays Monte Carlo runner
//!
//! Usage:
//!   cluster-sim --spins 1000000 --seed 42
//!   cluster-sim --config game.yaml --threads 8
//!   cluster-sim --sim-config run.yaml --spins 50000
//!
//! Flags given on the command line override values from `--sim-config`.
//! Prints the finalized result as JSON on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rf_cluster_lab::GameConfig;
use rf_cluster_sim::{SimConfig, Simulator};

#[derive(Parser)]
#[command(name = "cluster-sim", about = "Cluster-pays slot Monte Carlo simulator")]
struct Cli {
    /// Base rounds to simulate [default: 1000000]
    #[arg(short, long)]
    spins: Option<u64>,

    /// Root seed (random when omitted and no run config is given)
    #[arg(long)]
    seed: Option<u64>,

    /// Game config file (.json, .yaml or .yml); Quantum Cats when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run config file (.json, .yaml or .yml) with spins, seed, batch_size, threads
    #[arg(long)]
    sim_config: Option<PathBuf>,

    /// Worker threads (defaults to logical CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Rounds per batch [default: 100000]
    #[arg(long)]
    batch_size: Option<u64>,
}

impl Cli {
    /// Run config from `--sim-config` (or defaults), then command line overrides
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.sim_config {
            Some(path) => SimConfig::from_path(path)
                .with_context(|| format!("Failed to load simulation config {}", path.display()))?,
            None => SimConfig::default().with_seed(rand::random()),
        };
        if let Some(spins) = self.spins {
            config = config.with_spins(spins);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let game = match &cli.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("Failed to load game config {}", path.display()))?,
        None => GameConfig::quantum_cats(),
    };

    let sim_config = cli.sim_config()?;

    let result = Simulator::new(game, sim_config)
        .context("Invalid simulation setup")?
        .run()
        .context("Simulation failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
