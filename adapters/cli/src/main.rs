#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that founds a colony and runs it headless.

mod config_file;
mod summary;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spore_colony_core::Command;
use spore_colony_world::{self as world, Colony};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config_file::RunFile;
use summary::{EventTally, RunSummary};

/// Runs a spore colony simulation and prints a summary of the final state.
#[derive(Debug, Parser)]
#[command(name = "spore-colony", version)]
struct Cli {
    /// TOML run file; defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of ticks to run, overriding the run file.
    #[arg(long)]
    ticks: Option<u64>,
    /// Master seed, overriding the run file.
    #[arg(long)]
    seed: Option<u64>,
    /// Buildings to construct before the first tick, by catalog name or code.
    #[arg(long = "build", value_name = "KIND", num_args = 1..)]
    builds: Vec<String>,
    /// Log filter such as `debug` or `spore_colony_world=trace`; falls back to `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

/// Entry point for the spore colony command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;
    let summary = run(&cli)?;
    print!("{summary}");
    Ok(())
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
    Ok(())
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let mut file = match &cli.config {
        Some(path) => config_file::load(path)?,
        None => RunFile::default(),
    };
    if let Some(seed) = cli.seed {
        file.colony.world.seed = seed;
    }
    let ticks = cli.ticks.unwrap_or(file.run.ticks);
    let requests: Vec<&String> = file.run.build.iter().chain(&cli.builds).collect();

    let mut colony = Colony::new(file.colony.clone()).context("failed to found colony")?;
    info!(
        seed = file.colony.world.seed,
        columns = file.colony.world.columns,
        rows = file.colony.world.rows,
        ticks,
        "colony founded"
    );

    let mut events = Vec::new();
    let mut tally = EventTally::default();
    for request in requests {
        let kind = config_file::resolve_kind(&file.colony.buildings, request)?;
        world::apply(
            &mut colony,
            Command::BuildStructure {
                kind,
                level: file.colony.buildings.tech_min,
                location: None,
                orientation: None,
            },
            &mut events,
        )
        .with_context(|| format!("failed to build `{request}`"))?;
        tally.drain(&mut events);
    }

    for _ in 0..ticks {
        let alive = colony.progress_a_step(&mut events).context("tick failed")?;
        tally.drain(&mut events);
        if !alive {
            warn!(tick = world::query::tick(&colony), "colony died out, stopping early");
            break;
        }
    }

    info!(
        births = tally.births,
        deaths = tally.deaths,
        rejected = tally.rejected,
        "run finished"
    );
    Ok(RunSummary::capture(&colony, &tally))
}
