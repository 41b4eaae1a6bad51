//! Replay a recorded engine input file without an engine attached.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use foray_runtime::driver::Driver;
use foray_runtime::game::TurnReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::time::Duration;

use super::engine_config;
use crate::config::Config;

pub fn run(
    config: Config,
    input: &Path,
    seed: Option<u64>,
    json: bool,
    orders: bool,
) -> Result<()> {
    if !input.exists() {
        bail!("Recording does not exist: {}", input.display());
    }
    let file =
        File::open(input).with_context(|| format!("Failed to open: {}", input.display()))?;
    let driver = Driver::new(engine_config(config.engine, seed));

    // stdout is for JSON reports, keep the spinner out of it
    let pb = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Bad spinner template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let mut failure = None;
    let mut busiest = (0, 0);
    let mut seen = 0.0;
    let mut wire: Vec<u8> = Vec::new();
    let sink: Box<dyn Write + '_> = if orders {
        Box::new(&mut wire)
    } else {
        Box::new(io::sink())
    };

    let stdout = io::stdout();
    let result = driver.run_with(BufReader::new(file), sink, |report: &TurnReport| {
        if report.orders.len() > busiest.1 {
            busiest = (report.turn, report.orders.len());
        }
        seen = report.stats.observed_fraction();
        if json {
            match serde_json::to_string(report) {
                Ok(line) => {
                    if let Err(e) = writeln!(stdout.lock(), "{line}") {
                        failure.get_or_insert_with(|| e.to_string());
                    }
                }
                Err(e) => {
                    failure.get_or_insert_with(|| e.to_string());
                }
            }
        } else {
            pb.set_message(format!(
                "turn {} · {} orders · {} objectives · {:.0}% seen",
                report.turn,
                report.orders.len(),
                report.catalog.live,
                seen * 100.0
            ));
        }
    });
    pb.finish_and_clear();

    let summary = result.with_context(|| format!("Replay of {} failed", input.display()))?;
    if let Some(e) = failure {
        bail!("Failed to write turn report: {e}");
    }

    if orders {
        io::stdout().write_all(&wire)?;
    }
    if json {
        return Ok(());
    }

    println!("{} Replayed {}", "✓".green(), input.display().to_string().cyan());
    println!();
    if let Some(settings) = &summary.settings {
        println!(
            "  {} {}x{} map, view radius² {}",
            "Map:".bold(),
            settings.rows,
            settings.cols,
            settings.view_radius2
        );
    }
    println!("  {} {}", "Turns:".bold(), summary.turns_played);
    println!("  {} {}", "Orders:".bold(), summary.total_orders);
    if busiest.1 > 0 {
        println!("  {} turn {} ({} orders)", "Busiest:".bold(), busiest.0, busiest.1);
    }
    println!("  {} {:.1}%", "Map seen:".bold(), seen * 100.0);
    println!("  {} {}", "Agents at end:".bold(), summary.final_agents);
    if summary.ended {
        let scores: Vec<String> = summary.scores.iter().map(|s| s.to_string()).collect();
        println!("  {} {}", "Scores:".bold(), scores.join(" "));
    } else {
        println!("  {} recording stops before the end of the game", "•".yellow());
    }
    Ok(())
}
