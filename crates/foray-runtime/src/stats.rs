//! Turn statistics — what the map looks like this turn.
//!
//! Telemetry only: these numbers are logged and reported but never feed back
//! into objective selection.

use crate::agent::Roster;
use crate::items::ItemLedger;
use foray_core::grid::Grid;
use foray_core::types::Tick;
use serde::Serialize;

/// Raw counts for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnCounts {
    pub area: usize,
    pub water: usize,
    pub observed: usize,
    pub visited: usize,
    pub food: usize,
    pub friendly_agents: usize,
    pub enemy_agents: usize,
    pub friendly_hills: usize,
    pub enemy_hills: usize,
}

/// Counts plus scarcity rates, `area / (count + 1)`: large when something is
/// rare, approaching 1 as it fills the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TurnStats {
    pub turn: Tick,
    pub counts: TurnCounts,
    pub rates: [f64; 8],
}

impl TurnStats {
    pub fn collect(turn: Tick, grid: &Grid, items: &ItemLedger, roster: &Roster) -> Self {
        let counts = TurnCounts {
            area: grid.area(),
            water: grid.destroyed_count(),
            observed: grid.observed_count(),
            visited: grid.visited_count(),
            food: items.food_squares(grid).len(),
            friendly_agents: roster.len(),
            enemy_agents: grid.squares().filter(|s| s.enemy.is_some()).count(),
            friendly_hills: items.friendly_hills(grid).len(),
            enemy_hills: items.enemy_hills(grid).len(),
        };
        let area = counts.area as f64;
        let rate = |count: usize| area / (count as f64 + 1.0);
        let rates = [
            rate(counts.water),
            rate(counts.observed),
            rate(counts.visited),
            rate(counts.food),
            rate(counts.friendly_agents),
            rate(counts.enemy_agents),
            rate(counts.friendly_hills),
            rate(counts.enemy_hills),
        ];
        Self { turn, counts, rates }
    }

    /// Share of the map observed so far, in `[0, 1]`.
    pub fn observed_fraction(&self) -> f64 {
        if self.counts.area == 0 {
            return 0.0;
        }
        self.counts.observed as f64 / self.counts.area as f64
    }
}
