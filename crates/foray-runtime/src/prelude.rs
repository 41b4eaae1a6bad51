//! Foray Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use foray_runtime::prelude::*;
//! ```

pub use foray_core::prelude::*;

pub use crate::agent::{Agent, Roster};
pub use crate::config::{EngineConfig, Priorities};
pub use crate::driver::{Driver, GameSummary};
pub use crate::frontier::DrainSummary;
pub use crate::game::{Game, TurnReport};
pub use crate::items::ItemLedger;
pub use crate::objective::{Catalog, CatalogSummary, Objective, ObjectiveKind};
pub use crate::protocol::{format_order, parse_line, GameSettings, Record};
pub use crate::selector::{Order, Selection};
pub use crate::stats::{TurnCounts, TurnStats};
