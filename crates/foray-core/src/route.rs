//! Routes — nearest-hop-first paths toward an objective's destination.
//!
//! A route stored on square `S` for objective `O` lists the squares an agent
//! standing on `S` steps through to reach `O`'s destination; the destination
//! itself is the last element and the empty route means "already there".
//!
//! Routes are persistent linked lists: extending a route by one hop shares the
//! whole tail with the route it came from, so a breadth-first search that
//! writes one route per square only allocates one link per square.

use crate::types::SquareId;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct Hop {
    square: SquareId,
    next: Option<Rc<Hop>>,
}

/// Immutable, cheaply clonable sequence of squares.
#[derive(Clone, Default)]
pub struct Route {
    head: Option<Rc<Hop>>,
    len: usize,
}

impl Route {
    /// The zero-length route.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A new route whose first hop is `square`, followed by `self`.
    pub fn prepend(&self, square: SquareId) -> Self {
        Self {
            head: Some(Rc::new(Hop {
                square,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The next square to step onto, if any.
    pub fn first(&self) -> Option<SquareId> {
        self.head.as_ref().map(|hop| hop.square)
    }

    /// The final square of the route.
    pub fn last(&self) -> Option<SquareId> {
        self.iter().last()
    }

    pub fn iter(&self) -> RouteIter<'_> {
        RouteIter {
            next: self.head.as_deref(),
        }
    }

    pub fn to_vec(&self) -> Vec<SquareId> {
        self.iter().collect()
    }
}

impl FromIterator<SquareId> for Route {
    /// Builds a route from hops given nearest first.
    fn from_iter<I: IntoIterator<Item = SquareId>>(iter: I) -> Self {
        let hops: Vec<SquareId> = iter.into_iter().collect();
        hops.into_iter()
            .rev()
            .fold(Route::empty(), |route, square| route.prepend(square))
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for Route {}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|s| s.0)).finish()
    }
}

/// Iterator over the squares of a [`Route`], nearest first.
pub struct RouteIter<'a> {
    next: Option<&'a Hop>,
}

impl<'a> Iterator for RouteIter<'a> {
    type Item = SquareId;

    fn next(&mut self) -> Option<SquareId> {
        let hop = self.next?;
        self.next = hop.next.as_deref();
        Some(hop.square)
    }
}
