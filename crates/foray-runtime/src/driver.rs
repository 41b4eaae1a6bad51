//! Driver — plays a whole game over any line-oriented reader and writer.
//!
//! Reads the settings header, answers `go`, then feeds each turn's records
//! into a [`Game`] and writes its orders back. Works the same over
//! stdin/stdout during a match and over a recorded input file during replay.

use crate::config::EngineConfig;
use crate::game::{Game, TurnReport};
use crate::protocol::{format_order, parse_line, GameSettings, Record};
use foray_core::error::{ForayError, ProtocolError, Result};
use foray_core::types::Tick;
use serde::Serialize;
use std::io::{BufRead, Write};

/// How a game ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameSummary {
    pub settings: Option<GameSettings>,
    pub turns_played: Tick,
    pub total_orders: usize,
    pub final_agents: usize,
    pub players: Option<usize>,
    pub scores: Vec<i64>,
    /// Whether the engine sent `end` before input ran out.
    pub ended: bool,
}

/// Runs games with a fixed engine configuration.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: EngineConfig,
}

impl Driver {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<GameSummary> {
        self.run_with(input, output, |_| {})
    }

    /// Play a game, calling `on_turn` with every turn's report.
    pub fn run_with<R, W, F>(&self, input: R, mut output: W, mut on_turn: F) -> Result<GameSummary>
    where
        R: BufRead,
        W: Write,
        F: FnMut(&TurnReport),
    {
        let mut lines = input.lines();
        let mut summary = GameSummary::default();

        let mut pairs: Vec<(String, i64)> = Vec::new();
        loop {
            let line = lines.next().ok_or(ProtocolError::UnexpectedEof)??;
            match parse_line(&line)? {
                Record::Turn(0) | Record::Blank => {}
                Record::Turn(found) => {
                    return Err(ProtocolError::TurnOutOfSequence { expected: 0, found }.into());
                }
                Record::Setting { key, value } => pairs.push((key, value)),
                Record::Ready => break,
                Record::Unknown(text) => {
                    tracing::warn!(line = %text, "ignoring unknown header line")
                }
                _ => {
                    return Err(ForayError::malformed(line, "unexpected record in settings header"))
                }
            }
        }
        let settings = GameSettings::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), *v)))?;
        summary.settings = Some(settings.clone());
        let mut game = Game::new(settings, self.config.clone())?;
        writeln!(output, "go")?;
        output.flush()?;

        let mut in_turn = false;
        for line in lines {
            let line = line?;
            let record = parse_line(&line)?;
            if summary.ended {
                match record {
                    Record::Players(n) => summary.players = Some(n),
                    Record::Score(scores) => summary.scores = scores,
                    Record::Go => break,
                    _ => {}
                }
                continue;
            }
            match record {
                Record::Turn(turn) => {
                    game.begin_turn(turn)?;
                    in_turn = true;
                }
                Record::Go if in_turn => {
                    let report = game.play_turn()?;
                    for order in &report.orders {
                        writeln!(output, "{}", format_order(order))?;
                    }
                    writeln!(output, "go")?;
                    output.flush()?;
                    summary.turns_played = report.turn;
                    summary.total_orders += report.orders.len();
                    on_turn(&report);
                    in_turn = false;
                }
                Record::End => summary.ended = true,
                Record::Players(n) => summary.players = Some(n),
                Record::Score(scores) => summary.scores = scores,
                Record::Blank => {}
                Record::Unknown(text) => tracing::warn!(line = %text, "ignoring unknown line"),
                ref map_record if map_record.location().is_some() && in_turn => {
                    game.apply(map_record)?;
                }
                _ => return Err(ForayError::malformed(line, "record outside of a turn")),
            }
        }

        if !summary.ended {
            tracing::warn!(turns = summary.turns_played, "input ended without end of game");
        }
        summary.final_agents = game.roster().len();
        tracing::info!(
            turns = summary.turns_played,
            orders = summary.total_orders,
            agents = summary.final_agents,
            "game over"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "turn 0\nloadtime 3000\nturntime 1000\nrows 4\ncols 4\nturns 10\n\
                          viewradius2 4\nattackradius2 5\nspawnradius2 1\nplayer_seed 9\nready\n";

    #[test]
    fn answers_header_with_go() {
        let mut out = Vec::new();
        let summary = Driver::default().run(HEADER.as_bytes(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "go\n");
        assert_eq!(summary.settings.unwrap().rows, 4);
        assert!(!summary.ended);
    }

    #[test]
    fn truncated_header_is_an_error() {
        let err = Driver::default()
            .run("turn 0\nrows 4\n".as_bytes(), Vec::new())
            .unwrap_err();
        assert_eq!(err, ProtocolError::UnexpectedEof.into());
    }

    #[test]
    fn records_before_a_turn_are_rejected() {
        let input = format!("{HEADER}f 1 1\n");
        let err = Driver::default().run(input.as_bytes(), Vec::new()).unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn end_collects_scores() {
        let input = format!("{HEADER}turn 1\ngo\nend\nplayers 2\nscore 1 0\nf 0 0\ngo\n");
        let mut out = Vec::new();
        let summary = Driver::default().run(input.as_bytes(), &mut out).unwrap();
        assert!(summary.ended);
        assert_eq!(summary.turns_played, 1);
        assert_eq!(summary.players, Some(2));
        assert_eq!(summary.scores, vec![1, 0]);
        assert_eq!(String::from_utf8(out).unwrap(), "go\ngo\n");
    }
}
