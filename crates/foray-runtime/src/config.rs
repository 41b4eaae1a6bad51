//! Engine configuration — the tunables of search and selection.

use foray_core::error::{ForayError, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted `max_search_radius`.
pub const MAX_SEARCH_RADIUS: usize = 4096;

/// Fixed priority weight per objective kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priorities {
    /// Weight of Eat objectives (default: 100.0).
    pub eat: f64,
    /// Weight of Explore objectives (default: 10.0).
    pub explore: f64,
    /// Weight of wandering (default: 0.0).
    pub wander: f64,
}

impl Default for Priorities {
    fn default() -> Self {
        Self {
            eat: 100.0,
            explore: 10.0,
            wander: 0.0,
        }
    }
}

/// Configuration for one game of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Share of the turn time spent draining the search queue (default: 0.5).
    pub search_budget_fraction: f64,
    /// Longest route the search records; nodes at this depth are not
    /// expanded (default: 40, at most [`MAX_SEARCH_RADIUS`]).
    pub max_search_radius: usize,
    /// Score bonus for wandering onto a never-visited square (default: 3.0).
    pub wander_unvisited_bonus: f64,
    /// Objective priority weights.
    pub priorities: Priorities,
    /// RNG seed; falls back to the game's `player_seed` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_budget_fraction: 0.5,
            max_search_radius: 40,
            wander_unvisited_bonus: 3.0,
            priorities: Priorities::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.search_budget_fraction > 0.0 && self.search_budget_fraction <= 1.0) {
            return Err(ForayError::out_of_range(
                "search_budget_fraction",
                0.0,
                1.0,
                self.search_budget_fraction,
            ));
        }
        if !(1..=MAX_SEARCH_RADIUS).contains(&self.max_search_radius) {
            return Err(ForayError::invalid_config(
                "max_search_radius",
                self.max_search_radius.to_string(),
                format!("must be between 1 and {MAX_SEARCH_RADIUS}"),
            ));
        }
        if !self.wander_unvisited_bonus.is_finite() || self.wander_unvisited_bonus < 0.0 {
            return Err(ForayError::invalid_config(
                "wander_unvisited_bonus",
                self.wander_unvisited_bonus.to_string(),
                "must be a non-negative number",
            ));
        }
        let p = &self.priorities;
        if !(p.eat > p.explore && p.explore > p.wander) {
            return Err(ForayError::invalid_config(
                "priorities",
                format!("eat={} explore={} wander={}", p.eat, p.explore, p.wander),
                "must satisfy eat > explore > wander",
            ));
        }
        Ok(())
    }
}
