//! Line protocol spoken with the game engine.
//!
//! The engine sends a settings header ending in `ready`, then one block per
//! turn (`turn N`, map records, `go`) and finally `end`. The bot answers the
//! header and every turn with zero or more `o row col DIR` orders and `go`.

use crate::selector::Order;
use foray_core::error::{ForayError, ProtocolError, Result};
use foray_core::types::{Location, Owner, Tick};
use serde::{Deserialize, Serialize};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Turn(Tick),
    Setting { key: String, value: i64 },
    Ready,
    Go,
    End,
    Water(Location),
    Food(Location),
    Hill(Location, Owner),
    Ant(Location, Owner),
    DeadAnt(Location, Owner),
    Players(usize),
    Score(Vec<i64>),
    /// A line with a tag we do not know; logged and skipped.
    Unknown(String),
    Blank,
}

impl Record {
    /// The coordinate a map record refers to.
    pub fn location(&self) -> Option<Location> {
        match self {
            Record::Water(loc)
            | Record::Food(loc)
            | Record::Hill(loc, _)
            | Record::Ant(loc, _)
            | Record::DeadAnt(loc, _) => Some(*loc),
            _ => None,
        }
    }
}

const SETTING_KEYS: [&str; 9] = [
    "loadtime",
    "turntime",
    "rows",
    "cols",
    "turns",
    "viewradius2",
    "attackradius2",
    "spawnradius2",
    "player_seed",
];

/// Parse one line of engine input.
pub fn parse_line(line: &str) -> Result<Record> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some((&tag, args)) = fields.split_first() else {
        return Ok(Record::Blank);
    };

    let record = match tag {
        "turn" => Record::Turn(number(line, args, 0)?),
        "ready" => Record::Ready,
        "go" => Record::Go,
        "end" => Record::End,
        "w" => Record::Water(location(line, args)?),
        "f" => Record::Food(location(line, args)?),
        "h" => Record::Hill(location(line, args)?, number(line, args, 2)?),
        "a" => Record::Ant(location(line, args)?, number(line, args, 2)?),
        "d" => Record::DeadAnt(location(line, args)?, number(line, args, 2)?),
        "players" => Record::Players(number(line, args, 0)?),
        "score" => Record::Score(
            args.iter()
                .map(|s| s.parse::<i64>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| ForayError::malformed(line, e.to_string()))?,
        ),
        key if SETTING_KEYS.contains(&key) => Record::Setting {
            key: key.to_string(),
            value: number(line, args, 0)?,
        },
        _ => Record::Unknown(line.to_string()),
    };

    if let Some(expected) = arity(&record) {
        if args.len() != expected {
            return Err(ForayError::malformed(
                line,
                format!("expected {} fields after {:?}, found {}", expected, tag, args.len()),
            ));
        }
    }
    Ok(record)
}

fn arity(record: &Record) -> Option<usize> {
    match record {
        Record::Turn(_) | Record::Setting { .. } | Record::Players(_) => Some(1),
        Record::Ready | Record::Go | Record::End => Some(0),
        Record::Water(_) | Record::Food(_) => Some(2),
        Record::Hill(..) | Record::Ant(..) | Record::DeadAnt(..) => Some(3),
        Record::Score(_) | Record::Unknown(_) | Record::Blank => None,
    }
}

fn number<T: std::str::FromStr>(line: &str, args: &[&str], index: usize) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = args
        .get(index)
        .ok_or_else(|| ForayError::malformed(line, format!("missing field {}", index + 1)))?;
    raw.parse::<T>()
        .map_err(|e| ForayError::malformed(line, format!("field {:?}: {}", raw, e)))
}

fn location(line: &str, args: &[&str]) -> Result<Location> {
    Ok(Location::new(number(line, args, 0)?, number(line, args, 1)?))
}

/// Game parameters from the settings header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub loadtime_ms: u64,
    pub turntime_ms: u64,
    pub rows: usize,
    pub cols: usize,
    pub turns: u64,
    pub view_radius2: u64,
    pub attack_radius2: u64,
    pub spawn_radius2: u64,
    pub player_seed: u64,
}

impl GameSettings {
    /// Build settings from header `key value` pairs.
    ///
    /// `rows`, `cols`, `viewradius2` and `turntime` are required; the rest
    /// default to zero.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Result<Self> {
        let mut settings = GameSettings {
            loadtime_ms: 0,
            turntime_ms: 0,
            rows: 0,
            cols: 0,
            turns: 0,
            view_radius2: 0,
            attack_radius2: 0,
            spawn_radius2: 0,
            player_seed: 0,
        };
        let mut seen = Vec::new();
        for (key, value) in pairs {
            let unsigned = u64::try_from(value).map_err(|_| {
                ForayError::malformed(format!("{} {}", key, value), "negative setting")
            })?;
            match key {
                "loadtime" => settings.loadtime_ms = unsigned,
                "turntime" => settings.turntime_ms = unsigned,
                "rows" => settings.rows = unsigned as usize,
                "cols" => settings.cols = unsigned as usize,
                "turns" => settings.turns = unsigned,
                "viewradius2" => settings.view_radius2 = unsigned,
                "attackradius2" => settings.attack_radius2 = unsigned,
                "spawnradius2" => settings.spawn_radius2 = unsigned,
                "player_seed" => settings.player_seed = unsigned,
                other => {
                    tracing::warn!(key = other, value, "ignoring unknown setting");
                    continue;
                }
            }
            seen.push(key);
        }
        for required in ["rows", "cols", "viewradius2", "turntime"] {
            if !seen.contains(&required) {
                return Err(ProtocolError::MissingSetting(required.to_string()).into());
            }
        }
        if settings.rows == 0 || settings.cols == 0 {
            return Err(ForayError::malformed(
                format!("rows {} cols {}", settings.rows, settings.cols),
                "map must have at least one square",
            ));
        }
        Ok(settings)
    }
}

/// Wire form of an order: `o row col DIR`.
pub fn format_order(order: &Order) -> String {
    format!("o {} {} {}", order.from.row, order.from.col, order.direction)
}
