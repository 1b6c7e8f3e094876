//! Arbor CLI — drive hierarchical prefix routing from the command line.
//!
//! Subcommands: demo, route, check, init.

mod commands;

use std::path::PathBuf;

use arbor_core::{ArborConfig, LoggingConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Arbor — deliver packets through a prefix-addressed routing tree.
#[derive(Parser, Debug)]
#[command(name = "arbor", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML). Defaults apply if it is missing.
    #[arg(short, long, global = true, default_value = "arbor.toml")]
    config: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the sample tree and route the demo packets through it.
    Demo(commands::demo::DemoArgs),
    /// Route a single packet through a topology file.
    Route(commands::route::RouteArgs),
    /// Build a topology file and report structural problems.
    Check(commands::check::CheckArgs),
    /// Write a default configuration and a sample topology.
    Init(commands::init::InitArgs),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ArborConfig::load(&cli.config)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);
    tracing::debug!(config = ?config, "arbor v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Demo(args) => commands::demo::run(args, &config),
        Commands::Route(args) => commands::route::run(args, &config),
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Init(args) => commands::init::run(args),
    }
}
