//! Deferred node store — search steps waiting on unobserved squares.
//!
//! The search never writes routes through squares it has not seen. A node
//! headed onto an unobserved square is parked on that square instead, and
//! [`readmit`] releases it into the live queue in the turn the square is
//! first observed.

use foray_core::error::Result;
use foray_core::grid::Grid;
use foray_core::search::SearchQueue;
use foray_core::types::SquareId;

/// Move every node parked on the given (newly observed) squares back into the
/// queue. Returns how many nodes were readmitted.
pub fn readmit(
    grid: &mut Grid,
    queue: &mut SearchQueue,
    observed: &[SquareId],
) -> Result<usize> {
    let mut readmitted = 0;
    for square in observed {
        for node in grid.take_deferred(*square) {
            queue.push(node)?;
            readmitted += 1;
        }
    }
    Ok(readmitted)
}

/// Number of nodes parked across the whole map.
pub fn parked(grid: &Grid) -> usize {
    grid.parked_count()
}
