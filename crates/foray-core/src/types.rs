//! Shared types used across the Foray crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Turn counter as reported by the game engine.
pub type Tick = u64;

/// Player index. `0` is always us.
pub type Owner = u32;

/// The owner value the game engine uses for our own agents and hills.
pub const FRIENDLY: Owner = 0;

/// Arena index of a square: `row * cols + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SquareId(pub usize);

/// Stable identifier of an objective in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectiveId(pub u64);

/// Stable identifier of a friendly agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

/// Stable identifier of an item (food or hill) on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "objective#{}", self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

/// A normalized `(row, col)` coordinate on the torus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four single-step moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// `(row, col)` delta of one step in this direction.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    /// Wire character used in orders.
    pub fn as_char(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// What kind of item occupies a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Food,
    Hill { owner: Owner },
}

/// A food or hill sitting on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Last turn the game engine reported this item.
    pub last_seen: Tick,
}

impl Item {
    pub fn is_food(&self) -> bool {
        matches!(self.kind, ItemKind::Food)
    }

    pub fn is_friendly_hill(&self) -> bool {
        matches!(self.kind, ItemKind::Hill { owner } if owner == FRIENDLY)
    }

    pub fn is_enemy_hill(&self) -> bool {
        matches!(self.kind, ItemKind::Hill { owner } if owner != FRIENDLY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_chars_match_wire_format() {
        let chars: String = Direction::ALL.iter().map(|d| d.as_char()).collect();
        assert_eq!(chars, "NESW");
    }

    #[test]
    fn hill_ownership() {
        let mine = Item { id: ItemId(1), kind: ItemKind::Hill { owner: FRIENDLY }, last_seen: 0 };
        let theirs = Item { id: ItemId(2), kind: ItemKind::Hill { owner: 2 }, last_seen: 0 };
        assert!(mine.is_friendly_hill());
        assert!(!mine.is_enemy_hill());
        assert!(theirs.is_enemy_hill());
        assert!(!theirs.is_food());
    }
}
