//! Play one game against the engine on stdin/stdout.

use anyhow::{Context, Result};
use foray_runtime::driver::Driver;
use std::io;

use super::engine_config;
use crate::config::Config;

pub fn run(config: Config, seed: Option<u64>) -> Result<()> {
    let driver = Driver::new(engine_config(config.engine, seed));
    let stdin = io::stdin();
    let stdout = io::stdout();

    let summary = driver
        .run(stdin.lock(), stdout.lock())
        .context("Game aborted")?;

    tracing::info!(
        turns = summary.turns_played,
        orders = summary.total_orders,
        ended = summary.ended,
        scores = ?summary.scores,
        "played"
    );
    Ok(())
}
