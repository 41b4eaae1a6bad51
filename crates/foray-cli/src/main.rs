//! Foray CLI - plays the grid game over the engine's line protocol.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "foray")]
#[command(
    author,
    version,
    about = "Foray - goal-driven agents on a toroidal grid",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: foray.toml in this or a parent directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter for stderr, overrides RUST_LOG and the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game on stdin/stdout
    Play {
        /// RNG seed (default: the engine's player_seed)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Replay a recorded engine input file
    Replay {
        /// Recorded engine input
        input: PathBuf,

        /// RNG seed (default: the recording's player_seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print each turn report as a JSON line
        #[arg(long)]
        json: bool,

        /// Also print the orders the bot would have sent
        #[arg(long)]
        orders: bool,
    },

    /// Write a default foray.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing foray.toml
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path, force } = cli.command {
        return commands::init::run(path, force);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    init_logging(cli.log_level.as_deref(), &config.logging.level);

    match cli.command {
        Commands::Play { seed } => commands::play::run(config, seed),
        Commands::Replay {
            input,
            seed,
            json,
            orders,
        } => commands::replay::run(config, &input, seed, json, orders),
        Commands::Init { .. } => Ok(()),
    }
}

/// Logs go to stderr; stdout belongs to the protocol.
fn init_logging(flag: Option<&str>, configured: &str) {
    let filter = match flag {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
