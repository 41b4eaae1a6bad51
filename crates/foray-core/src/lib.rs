//! # Foray Core
//!
//! Map and search primitives for the Foray goal-assignment engine.
//!
//! - **Grid** — the toroidal map, visibility, observed/visited tracking
//! - **Route** — persistent nearest-hop-first paths to an objective
//! - **Search** — search nodes and the depth-bucketed queue that orders them
//! - **Error** — protocol, invariant and configuration failures
//!
//! ## Quick Start
//!
//! ```rust
//! use foray_core::prelude::*;
//!
//! let mut grid = Grid::new(20, 20, 9)?;
//! let start = grid.id_of(Location::new(3, 4));
//! let seen = grid.visit(start);
//! assert!(seen.contains(&start));
//! # Ok::<(), ForayError>(())
//! ```

pub mod error;
pub mod grid;
pub mod prelude;
pub mod route;
pub mod search;
pub mod types;
