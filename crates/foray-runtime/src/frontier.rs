//! Frontier search — one breadth-first traversal shared by every objective.
//!
//! All objectives feed nodes into the same [`SearchQueue`]; draining it writes
//! a shortest route toward each objective onto every square the search
//! reaches within the radius cap. The drain stops at a wall-clock deadline and
//! whatever is left in the queue carries over to the next turn.

use crate::objective::Catalog;
use foray_core::error::{InvariantError, Result};
use foray_core::grid::Grid;
use foray_core::search::SearchQueue;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::time::Instant;

/// What one drain accomplished, for telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    pub popped: usize,
    /// Routes written to square tables.
    pub recorded: usize,
    /// Nodes dropped as stale, invalid, or beaten by an earlier route.
    pub discarded: usize,
    /// Nodes parked on unobserved squares.
    pub deferred: usize,
    pub max_depth: usize,
    /// Nodes still queued when the drain stopped.
    pub remaining: usize,
    pub timed_out: bool,
}

/// Drain the queue until it is empty or `deadline` passes.
pub fn drain(
    grid: &mut Grid,
    catalog: &mut Catalog,
    queue: &mut SearchQueue,
    deadline: Instant,
) -> Result<DrainSummary> {
    let mut summary = DrainSummary::default();
    let mut last_depth = 0;

    loop {
        if Instant::now() >= deadline {
            summary.timed_out = !queue.is_empty();
            break;
        }
        let Some(node) = queue.pop() else {
            break;
        };
        summary.popped += 1;

        let depth = node.depth();
        if depth < last_depth {
            return Err(InvariantError::DepthRegression {
                previous: last_depth,
                found: depth,
            }
            .into());
        }
        last_depth = depth;
        summary.max_depth = summary.max_depth.max(depth);

        let live = catalog
            .get(node.objective)
            .is_some_and(|o| o.generation == node.generation && o.is_valid(grid));
        if !live {
            summary.discarded += 1;
            continue;
        }

        let Some(cell) = grid.square_mut(node.square) else {
            summary.discarded += 1;
            continue;
        };
        match cell.routes.entry(node.objective) {
            Entry::Occupied(_) => {
                summary.discarded += 1;
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(node.route.clone());
                summary.recorded += 1;
            }
        }
        if depth == 0 {
            catalog.seed_landed(node.objective);
        }
        if depth >= queue.max_radius() {
            continue;
        }

        let neighbors = cell.neighbors().to_vec();
        for neighbor in neighbors {
            let observed = match grid.square(neighbor) {
                Some(next) if !next.routes.contains_key(&node.objective) => next.is_observed(),
                _ => continue,
            };
            let child = node.extend_to(neighbor);
            if observed {
                queue.push(child)?;
            } else if grid.defer(neighbor, child) {
                summary.deferred += 1;
            }
        }
    }

    summary.remaining = queue.len();
    if summary.timed_out {
        tracing::debug!(
            remaining = summary.remaining,
            popped = summary.popped,
            "search deadline reached"
        );
    }
    Ok(summary)
}
