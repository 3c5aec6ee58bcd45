//! Travel-behaviour initial-condition generator.
//!
//! Writes one timestamped output directory holding the behaviour catalog and,
//! for every run, a belief catalog and a compressed agent population.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use seed_core::config::DEFAULT_CONFIG_PATH;
use seed_core::{Config, DirectorySink, GenerationError, RunOrchestrator};

/// Command line arguments for the generator
#[derive(Parser, Debug)]
#[command(name = "travel_seed")]
#[command(about = "Generate initial beliefs, agents and social graphs for travel-mode simulations")]
struct Args {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Number of runs to generate
    #[arg(long)]
    runs: Option<u32>,

    /// Index of the first run
    #[arg(long)]
    start_run: Option<u32>,

    /// Agents per run
    #[arg(long)]
    population: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Directory in which the timestamped output directory is created
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        let generation = &mut config.generation;
        if let Some(runs) = self.runs {
            generation.runs = runs;
        }
        if let Some(start_run) = self.start_run {
            generation.start_run = start_run;
        }
        if let Some(population) = self.population {
            generation.population = population;
        }
        if self.seed.is_some() {
            generation.seed = self.seed;
        }
        if let Some(root) = &self.output_root {
            generation.output_root = root.clone();
        }
    }
}

fn run(args: &Args) -> Result<(), GenerationError> {
    let mut config = Config::load_or_default(&args.config)?;
    args.apply(&mut config);

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let orchestrator = RunOrchestrator::new(config)?;
    let mut sink = DirectorySink::create(&orchestrator.config().generation.output_root)?;
    orchestrator.run(&mut sink)?;

    tracing::info!(
        "Wrote {} files to {}",
        sink.files_written(),
        sink.output_dir().display()
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
