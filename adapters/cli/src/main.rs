#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for exercising the Rampart progression engine.

mod config;
mod report;
mod simulate;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rampart_core::ProgressionConfig;
use rampart_session::{
    snapshot::{self, SessionSnapshot},
    GameSession,
};
use rampart_system_leveling::ExperienceCurve;
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by the Rampart CLI.
#[derive(Debug, Parser)]
#[command(name = "rampart", version, about = "Rampart progression toolkit")]
pub(crate) struct CliArgs {
    /// Progression configuration file in TOML format.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Raises log verbosity; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands supported by the CLI.
#[derive(Debug, Subcommand)]
pub(crate) enum CliCommand {
    /// Prints the experience requirement of every level.
    Curve,
    /// Plays a seeded session of kills, pickups and hits.
    Simulate(simulate::SimulateArgs),
    /// Loads a saved snapshot, normalizes it and prints the result.
    Inspect {
        /// Snapshot file holding JSON or a transfer code.
        path: PathBuf,
        /// Prints the normalized snapshot as a transfer code.
        #[arg(long)]
        code: bool,
    },
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let config = config::load(args.config.as_deref())?;
    match args.command {
        CliCommand::Curve => {
            print_curve(&config);
            Ok(())
        }
        CliCommand::Simulate(options) => simulate::run(config, &options),
        CliCommand::Inspect { path, code } => inspect(config, &path, code),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_curve(config: &ProgressionConfig) {
    let curve = ExperienceCurve::new(&config.leveling);
    println!("{:>5}  {:>12}  {:>14}  {:>6}", "level", "requirement", "cumulative", "points");
    for (level, requirement) in curve.iter() {
        let next = level + 1;
        let marker = if config.leveling.is_milestone(next) { " *" } else { "" };
        println!(
            "{:>5}  {:>12}  {:>14}  {:>6}{marker}",
            level,
            requirement,
            curve.total_to_reach(next),
            config.leveling.points_for_level(next),
        );
    }
    println!("{:>5}  {:>12}", curve.max_level(), "max");
}

fn inspect(config: ProgressionConfig, path: &Path, code: bool) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot at {}", path.display()))?;
    let decoded = SessionSnapshot::decode(&contents).with_context(|| {
        format!("failed to decode snapshot at {}", path.display())
    })?;

    let mut session = GameSession::new(config).context("invalid progression configuration")?;
    snapshot::restore(&mut session, &decoded);
    let normalized = snapshot::capture(&session);

    if code {
        println!("{}", normalized.to_transfer_code()?);
    } else {
        report::print_session(&session);
    }
    Ok(())
}
