//! Search nodes and the depth-bucketed queue that orders them.
//!
//! The queue holds nodes for every objective at once. Buckets are indexed by
//! route length, so popping always yields a node of the smallest depth still
//! queued and a breadth-first traversal falls out without a heap.

use crate::error::{InvariantError, Result};
use crate::route::Route;
use crate::types::{ObjectiveId, SquareId};

/// One pending step of the shared breadth-first search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    /// Square this node will record a route on.
    pub square: SquareId,
    pub objective: ObjectiveId,
    /// Search generation of the objective when the node was created.
    /// Nodes from an older generation are stale and get discarded.
    pub generation: u32,
    /// Route from `square` to the objective's destination.
    pub route: Route,
}

impl SearchNode {
    /// The zero-length node that starts a search at an objective's destination.
    pub fn seed(destination: SquareId, objective: ObjectiveId, generation: u32) -> Self {
        Self {
            square: destination,
            objective,
            generation,
            route: Route::empty(),
        }
    }

    /// The node one step further out, on `neighbor`.
    pub fn extend_to(&self, neighbor: SquareId) -> Self {
        Self {
            square: neighbor,
            objective: self.objective,
            generation: self.generation,
            route: self.route.prepend(self.square),
        }
    }

    pub fn depth(&self) -> usize {
        self.route.len()
    }
}

/// Buckets of search nodes indexed by depth, `0..=max_radius`.
#[derive(Debug)]
pub struct SearchQueue {
    buckets: Vec<Vec<SearchNode>>,
    /// Lowest bucket that may be non-empty.
    cursor: usize,
    len: usize,
}

impl SearchQueue {
    pub fn new(max_radius: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); max_radius + 1],
            cursor: 0,
            len: 0,
        }
    }

    /// Deepest route length the queue accepts.
    pub fn max_radius(&self) -> usize {
        self.buckets.len() - 1
    }

    /// Insert at the head of the node's bucket.
    pub fn push(&mut self, node: SearchNode) -> Result<()> {
        let depth = node.depth();
        let max = self.max_radius();
        let bucket = self
            .buckets
            .get_mut(depth)
            .ok_or(InvariantError::DepthBeyondRadius { depth, max })?;
        bucket.push(node);
        self.len += 1;
        if depth < self.cursor {
            self.cursor = depth;
        }
        Ok(())
    }

    /// Remove the head of the lowest non-empty bucket.
    pub fn pop(&mut self) -> Option<SearchNode> {
        while let Some(bucket) = self.buckets.get_mut(self.cursor) {
            if let Some(node) = bucket.pop() {
                self.len -= 1;
                return Some(node);
            }
            self.cursor += 1;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
