//! # Foray Runtime
//!
//! Turn engine for agents on a toroidal grid under fog of war.
//!
//! The runtime owns a game from the settings header to the final score. Each
//! turn it keeps a catalog of objectives (food to eat, frontier to explore),
//! runs one shared breadth-first search that writes a route toward every
//! objective onto the squares it reaches, and lets every agent pick the best
//! objective its square knows a route to.
//!
//! ## Quick Start
//!
//! ```rust
//! use foray_runtime::prelude::*;
//!
//! let input = "turn 0\nturntime 500\nrows 8\ncols 8\nviewradius2 9\nready\n";
//! let mut output = Vec::new();
//! let summary = Driver::new(EngineConfig::default())
//!     .run(input.as_bytes(), &mut output)
//!     .unwrap();
//! assert_eq!(summary.settings.unwrap().rows, 8);
//! ```

pub mod agent;
pub mod config;
pub mod deferred;
pub mod driver;
pub mod frontier;
pub mod game;
pub mod items;
pub mod objective;
pub mod prelude;
pub mod protocol;
pub mod selector;
pub mod stats;
