//! Item ledger — food and hills reported by the game engine.
//!
//! The game engine only reports items that are currently visible, so an item
//! is assumed to persist until a turn where it goes unreported even though a
//! friendly agent could see its square. Then it is gone (eaten or razed).

use foray_core::error::{InvariantError, Result};
use foray_core::grid::Grid;
use foray_core::types::{Item, ItemId, ItemKind, SquareId, Tick};
use std::collections::BTreeSet;

/// Squares currently holding an item.
#[derive(Debug, Default)]
pub struct ItemLedger {
    squares: BTreeSet<SquareId>,
    next_id: u64,
}

impl ItemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Record a sighting. Reuses the item already on the square when it is of
    /// the same kind, otherwise replaces it with a new one.
    pub fn sense(
        &mut self,
        grid: &mut Grid,
        square: SquareId,
        kind: ItemKind,
        turn: Tick,
    ) -> Result<ItemId> {
        let location = grid.location(square);
        let cell = grid
            .square_mut(square)
            .ok_or(InvariantError::MissingSquare(location))?;
        if let Some(item) = cell.item.as_mut() {
            if item.kind == kind {
                item.last_seen = turn;
                return Ok(item.id);
            }
        }
        let id = ItemId(self.next_id);
        self.next_id += 1;
        cell.item = Some(Item {
            id,
            kind,
            last_seen: turn,
        });
        self.squares.insert(square);
        tracing::trace!(item = id.0, row = location.row, col = location.col, ?kind, "item sighted");
        Ok(id)
    }

    /// Drop items that went unreported on `turn` while in view of a friendly agent.
    pub fn remove_unsensed(&mut self, grid: &mut Grid, turn: Tick) -> Vec<(SquareId, Item)> {
        let mut removed = Vec::new();
        let candidates: Vec<SquareId> = self.squares.iter().copied().collect();
        for square in candidates {
            let stale = match grid.square(square).and_then(|s| s.item) {
                Some(item) => item.last_seen != turn,
                None => {
                    self.squares.remove(&square);
                    continue;
                }
            };
            if !stale || !watched_by_friend(grid, square) {
                continue;
            }
            if let Some(item) = grid.square_mut(square).and_then(|s| s.item.take()) {
                removed.push((square, item));
            }
            self.squares.remove(&square);
        }
        removed
    }

    /// Forget a square removed from the map.
    pub fn forget(&mut self, square: SquareId) {
        self.squares.remove(&square);
    }

    /// Squares holding food, in id order.
    pub fn food_squares(&self, grid: &Grid) -> Vec<SquareId> {
        self.squares_where(grid, Item::is_food)
    }

    pub fn friendly_hills(&self, grid: &Grid) -> Vec<SquareId> {
        self.squares_where(grid, Item::is_friendly_hill)
    }

    pub fn enemy_hills(&self, grid: &Grid) -> Vec<SquareId> {
        self.squares_where(grid, Item::is_enemy_hill)
    }

    fn squares_where(&self, grid: &Grid, pred: fn(&Item) -> bool) -> Vec<SquareId> {
        self.squares
            .iter()
            .copied()
            .filter(|sq| grid.square(*sq).and_then(|s| s.item.as_ref()).is_some_and(pred))
            .collect()
    }
}

fn watched_by_friend(grid: &Grid, square: SquareId) -> bool {
    grid.visible_squares(square)
        .into_iter()
        .any(|seen| grid.square(seen).is_some_and(|s| s.agent.is_some()))
}
