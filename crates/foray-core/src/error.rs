//! Error types for Foray operations.
//!
//! Every error here is fatal for the turn loop. Situations the engine can
//! recover from (an objective dying mid-search, an agent with nowhere to go,
//! a search deadline) are never reported through these types.

use crate::types::{AgentId, Location, Tick};
use thiserror::Error;

/// Result type for Foray operations.
pub type Result<T> = std::result::Result<T, ForayError>;

/// Errors that can occur while playing a game.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForayError {
    /// The game engine sent something we cannot make sense of.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// Internal bookkeeping went wrong.
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),
    /// Engine configuration is unusable.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ForayError {
    fn from(e: std::io::Error) -> Self {
        ForayError::Io(e.to_string())
    }
}

/// Malformed or inconsistent input from the game engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("Malformed line {line:?}: {reason}")]
    Malformed { line: String, reason: String },
    #[error("Turn out of sequence: expected {expected}, found {found}")]
    TurnOutOfSequence { expected: Tick, found: Tick },
    #[error("Coordinate ({row}, {col}) outside {rows}x{cols} map")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Friendly agent reported at {0} with no record of it")]
    UnknownAgent(Location),
    #[error("Missing required setting: {0}")]
    MissingSetting(String),
    #[error("Unexpected end of input")]
    UnexpectedEof,
}

/// Violations of the engine's own invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantError {
    #[error("Search depth regressed from {previous} to {found}")]
    DepthRegression { previous: usize, found: usize },
    #[error("Search node at depth {depth} exceeds radius cap {max}")]
    DepthBeyondRadius { depth: usize, max: usize },
    #[error("Ordered move from {from} to non-adjacent {to}")]
    NonAdjacentOrder { from: Location, to: Location },
    #[error("Square {0} does not exist")]
    MissingSquare(Location),
    #[error("Unknown {0}")]
    UnknownAgent(AgentId),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    #[error("{field} out of range: {value} (must be {min}-{max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl ForayError {
    pub fn malformed(line: impl Into<String>, reason: impl Into<String>) -> Self {
        ForayError::Protocol(ProtocolError::Malformed {
            line: line.into(),
            reason: reason.into(),
        })
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ForayError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        ForayError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, ForayError::Protocol(_))
    }

    pub fn is_invariant(&self) -> bool {
        matches!(self, ForayError::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        let protocol: ForayError = ProtocolError::UnexpectedEof.into();
        let invariant: ForayError =
            InvariantError::DepthRegression { previous: 3, found: 1 }.into();
        assert!(protocol.is_protocol());
        assert!(!protocol.is_invariant());
        assert!(invariant.is_invariant());
        assert!(!invariant.is_protocol());
    }

    #[test]
    fn messages_name_the_offending_input() {
        let err = ForayError::malformed("f 1", "expected 2 fields");
        assert_eq!(
            err.to_string(),
            "Protocol error: Malformed line \"f 1\": expected 2 fields"
        );
    }
}
