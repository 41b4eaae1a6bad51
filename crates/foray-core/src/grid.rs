//! Grid — the toroidal map, its squares, and what we have seen of it.
//!
//! Every square of the `rows × cols` torus lives in one arena indexed by
//! [`SquareId`]. Squares are created up front, start unobserved, and are
//! removed only when the game engine reports water on them. Neighbor lists
//! are memoized at construction and pruned on removal.
//!
//! Visibility uses a circular mask of offsets computed once per grid from
//! the game's `viewradius2`. Both `observed` and `visited` only ever go from
//! false to true.

use crate::error::{ForayError, Result};
use crate::route::Route;
use crate::search::SearchNode;
use crate::types::{AgentId, Direction, Item, Location, ObjectiveId, Owner, SquareId};
use std::collections::{BTreeSet, HashMap};

/// Largest map the engine accepts, in squares.
pub const MAX_AREA: usize = 1 << 24;

/// One cell of the map.
#[derive(Debug)]
pub struct Square {
    pub id: SquareId,
    pub location: Location,
    observed: bool,
    visited: bool,
    /// Food or hill on this square.
    pub item: Option<Item>,
    /// Friendly agent standing here this turn.
    pub agent: Option<AgentId>,
    /// Friendly agent that will stand here next turn.
    pub next_agent: Option<AgentId>,
    /// Owner of an enemy agent seen here this turn.
    pub enemy: Option<Owner>,
    /// Route from this square to each objective's destination.
    pub routes: HashMap<ObjectiveId, Route>,
    deferred: Vec<SearchNode>,
    neighbors: Vec<SquareId>,
}

impl Square {
    fn new(id: SquareId, location: Location) -> Self {
        Self {
            id,
            location,
            observed: false,
            visited: false,
            item: None,
            agent: None,
            next_agent: None,
            enemy: None,
            routes: HashMap::new(),
            deferred: Vec::new(),
            neighbors: Vec::with_capacity(4),
        }
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn neighbors(&self) -> &[SquareId] {
        &self.neighbors
    }

    pub fn has_food(&self) -> bool {
        self.item.is_some_and(|item| item.is_food())
    }

    pub fn has_friendly_hill(&self) -> bool {
        self.item.is_some_and(|item| item.is_friendly_hill())
    }

    /// Search nodes waiting for this square to become observed.
    pub fn deferred(&self) -> &[SearchNode] {
        &self.deferred
    }

    /// Park `node` here unless an equally short node of the same search is
    /// already waiting. A shallower node replaces a deeper one.
    fn defer(&mut self, node: SearchNode) -> bool {
        let same_search = self
            .deferred
            .iter()
            .position(|n| n.objective == node.objective && n.generation == node.generation);
        match same_search {
            Some(i) if self.deferred[i].depth() <= node.depth() => false,
            Some(i) => {
                self.deferred[i] = node;
                true
            }
            None => {
                self.deferred.push(node);
                true
            }
        }
    }
}

/// What was left behind when a square was removed from the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destroyed {
    pub square: SquareId,
    /// Objectives that had a route recorded on the square.
    pub objectives: Vec<ObjectiveId>,
    /// Squares that were adjacent to it.
    pub former_neighbors: Vec<SquareId>,
}

/// The toroidal map.
#[derive(Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    squares: Vec<Option<Square>>,
    /// Visibility offsets: every `(dr, dc)` with `dr² + dc² < viewradius2`.
    mask: Vec<(i64, i64)>,
    /// Squares in the order they became observed.
    observed: Vec<SquareId>,
    /// Squares with a non-empty deferred list.
    parked: BTreeSet<SquareId>,
    destroyed: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, view_radius2: u64) -> Result<Self> {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let area = rows
            .checked_mul(cols)
            .filter(|area| *area <= MAX_AREA)
            .ok_or_else(|| {
                ForayError::invalid_config(
                    "map",
                    format!("{rows}x{cols}"),
                    format!("must have at most {MAX_AREA} squares"),
                )
            })?;
        let mut grid = Self {
            rows,
            cols,
            squares: Vec::with_capacity(area),
            mask: visibility_mask(view_radius2),
            observed: Vec::new(),
            parked: BTreeSet::new(),
            destroyed: 0,
        };

        for index in 0..area {
            let id = SquareId(index);
            let location = grid.location(id);
            grid.squares.push(Some(Square::new(id, location)));
        }
        for index in 0..area {
            let id = SquareId(index);
            let mut neighbors = Vec::with_capacity(4);
            for direction in Direction::ALL {
                let next = grid.step(id, direction);
                if next != id && !neighbors.contains(&next) {
                    neighbors.push(next);
                }
            }
            if let Some(square) = grid.squares[index].as_mut() {
                square.neighbors = neighbors;
            }
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of squares the map started with.
    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of squares removed as water.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Id of the square at a (possibly unnormalized) coordinate.
    pub fn wrap(&self, row: i64, col: i64) -> SquareId {
        let row = row.rem_euclid(self.rows as i64) as usize;
        let col = col.rem_euclid(self.cols as i64) as usize;
        SquareId(row * self.cols + col)
    }

    pub fn id_of(&self, location: Location) -> SquareId {
        self.wrap(location.row as i64, location.col as i64)
    }

    pub fn location(&self, id: SquareId) -> Location {
        Location::new(id.0 / self.cols, id.0 % self.cols)
    }

    /// The square one step from `id` in `direction`, whether or not it still exists.
    pub fn step(&self, id: SquareId, direction: Direction) -> SquareId {
        let loc = self.location(id);
        let (dr, dc) = direction.offset();
        self.wrap(loc.row as i64 + dr, loc.col as i64 + dc)
    }

    pub fn square(&self, id: SquareId) -> Option<&Square> {
        self.squares.get(id.0).and_then(Option::as_ref)
    }

    pub fn square_mut(&mut self, id: SquareId) -> Option<&mut Square> {
        self.squares.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn exists(&self, id: SquareId) -> bool {
        self.square(id).is_some()
    }

    /// All squares still on the map.
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter().flatten()
    }

    pub fn squares_mut(&mut self) -> impl Iterator<Item = &mut Square> {
        self.squares.iter_mut().flatten()
    }

    /// Memoized 4-connected neighbors; empty for a removed square.
    pub fn neighbors(&self, id: SquareId) -> &[SquareId] {
        self.square(id).map(Square::neighbors).unwrap_or(&[])
    }

    pub fn is_observed(&self, id: SquareId) -> bool {
        self.square(id).is_some_and(Square::is_observed)
    }

    pub fn is_visited(&self, id: SquareId) -> bool {
        self.square(id).is_some_and(Square::is_visited)
    }

    /// Observed squares still on the map, in observation order.
    pub fn observed(&self) -> impl Iterator<Item = SquareId> + '_ {
        self.observed.iter().copied().filter(|id| self.exists(*id))
    }

    pub fn observed_count(&self) -> usize {
        self.observed().count()
    }

    pub fn visited_count(&self) -> usize {
        self.squares().filter(|s| s.visited).count()
    }

    /// An observed square with at least one unobserved neighbor.
    pub fn is_frontier(&self, id: SquareId) -> bool {
        match self.square(id) {
            Some(square) if square.observed => square
                .neighbors
                .iter()
                .any(|n| !self.is_observed(*n)),
            _ => false,
        }
    }

    /// Squares within view of `id`, wrapped and deduplicated.
    pub fn visible_squares(&self, id: SquareId) -> Vec<SquareId> {
        let center = self.location(id);
        let mut visible: Vec<SquareId> = self
            .mask
            .iter()
            .map(|(dr, dc)| self.wrap(center.row as i64 + dr, center.col as i64 + dc))
            .filter(|id| self.exists(*id))
            .collect();
        visible.sort_unstable();
        visible.dedup();
        visible
    }

    /// Mark a square observed. Returns `true` the first time only.
    pub fn observe(&mut self, id: SquareId) -> bool {
        match self.square_mut(id) {
            Some(square) if !square.observed => {
                square.observed = true;
                self.observed.push(id);
                true
            }
            _ => false,
        }
    }

    /// Mark a square visited and observe everything in view of it.
    ///
    /// Returns the squares that became observed because of this call. A
    /// square that was already visited observes nothing new.
    pub fn visit(&mut self, id: SquareId) -> Vec<SquareId> {
        match self.square_mut(id) {
            Some(square) if !square.visited => square.visited = true,
            _ => return Vec::new(),
        }
        self.visible_squares(id)
            .into_iter()
            .filter(|visible| self.observe(*visible))
            .collect()
    }

    /// Suspend a search node on `id` until the square is observed.
    ///
    /// Returns `false` when the node was dropped: the square is gone, or an
    /// equally short node of the same objective and generation already waits.
    pub fn defer(&mut self, id: SquareId, node: SearchNode) -> bool {
        let Some(square) = self.square_mut(id) else {
            return false;
        };
        let parked = square.defer(node);
        if parked {
            self.parked.insert(id);
        }
        parked
    }

    /// Hand back every node suspended on `id`, leaving its list empty.
    pub fn take_deferred(&mut self, id: SquareId) -> Vec<SearchNode> {
        self.parked.remove(&id);
        self.square_mut(id)
            .map(|square| std::mem::take(&mut square.deferred))
            .unwrap_or_default()
    }

    /// Drop every suspended node of `objective`. Returns how many.
    pub fn prune_deferred(&mut self, objective: ObjectiveId) -> usize {
        let squares = &mut self.squares;
        let mut pruned = 0;
        self.parked.retain(|id| {
            let Some(Some(square)) = squares.get_mut(id.0) else {
                return false;
            };
            let before = square.deferred.len();
            square.deferred.retain(|n| n.objective != objective);
            pruned += before - square.deferred.len();
            !square.deferred.is_empty()
        });
        pruned
    }

    /// Nodes suspended across the whole map.
    pub fn parked_count(&self) -> usize {
        self.parked
            .iter()
            .filter_map(|id| self.square(*id))
            .map(|square| square.deferred.len())
            .sum()
    }

    /// Remove a square from the map and prune it from its neighbors.
    pub fn destroy(&mut self, id: SquareId) -> Option<Destroyed> {
        let square = self.squares.get_mut(id.0)?.take()?;
        self.destroyed += 1;
        self.parked.remove(&id);
        for neighbor in &square.neighbors {
            if let Some(n) = self.square_mut(*neighbor) {
                n.neighbors.retain(|x| *x != id);
            }
        }
        let mut objectives: Vec<ObjectiveId> = square.routes.keys().copied().collect();
        objectives.sort_unstable();
        Some(Destroyed {
            square: id,
            objectives,
            former_neighbors: square.neighbors,
        })
    }

    /// Clear per-turn occupancy before a new turn's reports arrive.
    pub fn reset_occupancy(&mut self) {
        for square in self.squares_mut() {
            square.agent = None;
            square.next_agent = None;
            square.enemy = None;
        }
    }

    /// Squared euclidean distance on the torus.
    pub fn distance2(&self, a: SquareId, b: SquareId) -> u64 {
        let (dr, dc) = self.axis_distances(a, b);
        (dr * dr + dc * dc) as u64
    }

    /// Manhattan distance on the torus, ignoring removed squares.
    pub fn hop_distance(&self, a: SquareId, b: SquareId) -> usize {
        let (dr, dc) = self.axis_distances(a, b);
        dr + dc
    }

    fn axis_distances(&self, a: SquareId, b: SquareId) -> (usize, usize) {
        let (a, b) = (self.location(a), self.location(b));
        let dr = a.row.abs_diff(b.row);
        let dc = a.col.abs_diff(b.col);
        (dr.min(self.rows - dr), dc.min(self.cols - dc))
    }

    /// The direction that steps from `from` onto `to`, if they are adjacent.
    pub fn direction_between(&self, from: SquareId, to: SquareId) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| from != to && self.step(from, *d) == to)
    }

    /// ASCII dump of the map for debug logs.
    ///
    /// `X` water, `a` friendly agent, `e` enemy agent, `*` food,
    /// `H` friendly hill, `h` enemy hill, `_` observed, `.` unobserved.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.area() + self.rows);
        for (index, cell) in self.squares.iter().enumerate() {
            let c = match cell {
                None => 'X',
                Some(s) if s.agent.is_some() => 'a',
                Some(s) if s.enemy.is_some() => 'e',
                Some(s) if s.has_food() => '*',
                Some(s) if s.has_friendly_hill() => 'H',
                Some(s) if s.item.is_some() => 'h',
                Some(s) if s.observed => '_',
                Some(_) => '.',
            };
            out.push(c);
            if (index + 1) % self.cols == 0 {
                out.push('\n');
            }
        }
        out
    }
}

fn visibility_mask(view_radius2: u64) -> Vec<(i64, i64)> {
    let r2 = view_radius2 as i64;
    let reach = (view_radius2 as f64).sqrt().ceil() as i64;
    let mut mask = Vec::new();
    for dr in -reach..=reach {
        for dc in -reach..=reach {
            if dr * dr + dc * dc < r2 {
                mask.push((dr, dc));
            }
        }
    }
    mask
}
