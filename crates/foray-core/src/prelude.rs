//! Foray Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use foray_core::prelude::*;
//! ```

pub use crate::types::{
    AgentId, Direction, Item, ItemId, ItemKind, Location, ObjectiveId, Owner, SquareId, Tick,
    FRIENDLY,
};

pub use crate::grid::{Destroyed, Grid, Square};
pub use crate::route::Route;
pub use crate::search::{SearchNode, SearchQueue};

pub use crate::error::{ConfigError, ForayError, InvariantError, ProtocolError, Result};
