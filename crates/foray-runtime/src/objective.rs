//! Objective catalog — what agents can go after, and where it is.
//!
//! Objectives are discovered from the map every turn: one Eat objective per
//! square adjacent to food, one Explore objective per observed frontier
//! square. Each live objective owns a breadth-first search rooted at its
//! destination whose results are written into the route tables of the squares
//! it reaches. When an objective stops being valid it is retired, which undoes
//! every one of those writes.
//!
//! Wander is the fallback of the order selector. It is never cataloged and
//! never valid, so nothing ever searches toward it.

use crate::agent::Roster;
use crate::config::Priorities;
use crate::items::ItemLedger;
use foray_core::error::Result;
use foray_core::grid::{Destroyed, Grid};
use foray_core::search::{SearchNode, SearchQueue};
use foray_core::types::{AgentId, ItemId, ObjectiveId, SquareId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// What an objective asks of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectiveKind {
    /// Stand next to a food item so it gets collected.
    Eat { food: SquareId, item: ItemId },
    /// Stand on a frontier square to reveal what lies beyond it.
    Explore,
    /// Step somewhere, anywhere.
    Wander,
}

impl ObjectiveKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectiveKind::Eat { .. } => "eat",
            ObjectiveKind::Explore => "explore",
            ObjectiveKind::Wander => "wander",
        }
    }

    pub fn priority(&self, priorities: &Priorities) -> f64 {
        match self {
            ObjectiveKind::Eat { .. } => priorities.eat,
            ObjectiveKind::Explore => priorities.explore,
            ObjectiveKind::Wander => priorities.wander,
        }
    }
}

/// Uniqueness key: at most one live objective per kind and destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ObjectiveKey {
    Eat(SquareId),
    Explore(SquareId),
}

impl ObjectiveKey {
    fn of(kind: ObjectiveKind, destination: SquareId) -> Option<Self> {
        match kind {
            ObjectiveKind::Eat { .. } => Some(ObjectiveKey::Eat(destination)),
            ObjectiveKind::Explore => Some(ObjectiveKey::Explore(destination)),
            ObjectiveKind::Wander => None,
        }
    }
}

/// A cataloged objective.
#[derive(Debug, Clone)]
pub struct Objective {
    pub id: ObjectiveId,
    pub kind: ObjectiveKind,
    pub destination: SquareId,
    pub priority: f64,
    /// Bumped whenever the objective's routes are thrown away and its search
    /// restarts; queued nodes of an older generation are stale.
    pub generation: u32,
    seed_pending: bool,
    pursuers: BTreeSet<AgentId>,
}

impl Objective {
    pub fn is_valid(&self, grid: &Grid) -> bool {
        if !grid.exists(self.destination) {
            return false;
        }
        match self.kind {
            ObjectiveKind::Eat { food, item } => grid
                .square(food)
                .and_then(|s| s.item)
                .is_some_and(|found| found.id == item && found.is_food()),
            ObjectiveKind::Explore => {
                !grid.is_visited(self.destination) && grid.is_frontier(self.destination)
            }
            ObjectiveKind::Wander => false,
        }
    }

    /// Whether a zero-length search node for this objective is still in flight.
    pub fn is_seed_pending(&self) -> bool {
        self.seed_pending
    }

    pub fn pursuers(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.pursuers.iter().copied()
    }
}

/// Per-turn catalog bookkeeping, for telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub live: usize,
    pub eat: usize,
    pub explore: usize,
    pub created: usize,
    pub retired: usize,
    pub seeded: usize,
}

/// All live objectives of a game.
#[derive(Debug)]
pub struct Catalog {
    objectives: BTreeMap<ObjectiveId, Objective>,
    index: HashMap<ObjectiveKey, ObjectiveId>,
    next_id: u64,
    priorities: Priorities,
}

impl Catalog {
    pub fn new(priorities: Priorities) -> Self {
        Self {
            objectives: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 0,
            priorities,
        }
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    pub fn get(&self, id: ObjectiveId) -> Option<&Objective> {
        self.objectives.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Objective> {
        self.objectives.values()
    }

    /// Live objective of `kind` at `destination`, if any.
    pub fn find(&self, kind: ObjectiveKind, destination: SquareId) -> Option<ObjectiveId> {
        ObjectiveKey::of(kind, destination).and_then(|key| self.index.get(&key).copied())
    }

    /// Add an objective unless one of the same kind already targets `destination`.
    ///
    /// The new objective has no search yet; [`Catalog::seed`] starts one.
    pub fn register(&mut self, kind: ObjectiveKind, destination: SquareId) -> Option<ObjectiveId> {
        let key = ObjectiveKey::of(kind, destination)?;
        if self.index.contains_key(&key) {
            return None;
        }
        let id = ObjectiveId(self.next_id);
        self.next_id += 1;
        self.index.insert(key, id);
        self.objectives.insert(
            id,
            Objective {
                id,
                kind,
                destination,
                priority: kind.priority(&self.priorities),
                generation: 0,
                seed_pending: false,
                pursuers: BTreeSet::new(),
            },
        );
        Some(id)
    }

    /// Start (or restart) an objective's search with a zero-length node at its
    /// destination. The node waits on the destination if it is not observed yet.
    pub fn seed(
        &mut self,
        id: ObjectiveId,
        grid: &mut Grid,
        queue: &mut SearchQueue,
    ) -> Result<()> {
        let Some(objective) = self.objectives.get_mut(&id) else {
            return Ok(());
        };
        let destination = objective.destination;
        if !grid.exists(destination) {
            return Ok(());
        }
        let node = SearchNode::seed(destination, id, objective.generation);
        objective.seed_pending = true;
        if grid.is_observed(destination) {
            queue.push(node)?;
        } else {
            grid.defer(destination, node);
        }
        Ok(())
    }

    /// The seed node reached its destination and recorded the empty route.
    pub fn seed_landed(&mut self, id: ObjectiveId) {
        if let Some(objective) = self.objectives.get_mut(&id) {
            objective.seed_pending = false;
        }
    }

    pub fn add_pursuer(&mut self, id: ObjectiveId, agent: AgentId) {
        if let Some(objective) = self.objectives.get_mut(&id) {
            objective.pursuers.insert(agent);
        }
    }

    pub fn remove_pursuer(&mut self, id: ObjectiveId, agent: AgentId) {
        if let Some(objective) = self.objectives.get_mut(&id) {
            objective.pursuers.remove(&agent);
        }
    }

    /// Remove an objective: its pursuers forget it, every route it wrote is
    /// stripped from the map and its parked search nodes are dropped.
    pub fn retire(
        &mut self,
        id: ObjectiveId,
        grid: &mut Grid,
        roster: &mut Roster,
    ) -> Option<Objective> {
        let objective = self.objectives.remove(&id)?;
        if let Some(key) = ObjectiveKey::of(objective.kind, objective.destination) {
            self.index.remove(&key);
        }
        for agent in objective.pursuers() {
            if let Some(agent) = roster.get_mut(agent) {
                if agent.objective == Some(id) {
                    agent.objective = None;
                }
            }
        }
        let stripped = strip_routes(grid, id, [objective.destination]);
        let unparked = grid.prune_deferred(id);
        tracing::trace!(
            objective = id.0,
            kind = objective.kind.label(),
            stripped,
            unparked,
            "objective retired"
        );
        Some(objective)
    }

    /// Retire every objective that is no longer valid. Returns how many.
    pub fn retire_invalid(&mut self, grid: &mut Grid, roster: &mut Roster) -> usize {
        let dead: Vec<ObjectiveId> = self
            .objectives
            .values()
            .filter(|o| !o.is_valid(grid))
            .map(|o| o.id)
            .collect();
        for id in &dead {
            self.retire(*id, grid, roster);
        }
        dead.len()
    }

    /// Throw away an objective's routes and restart its search from scratch.
    ///
    /// The strip walk starts at the destination and at every square in
    /// `also_from`, so a region cut off from the destination is still cleaned.
    pub fn restart_search(&mut self, id: ObjectiveId, grid: &mut Grid, also_from: &[SquareId]) {
        let Some(objective) = self.objectives.get_mut(&id) else {
            return;
        };
        objective.generation += 1;
        objective.seed_pending = false;
        let starts = std::iter::once(objective.destination).chain(also_from.iter().copied());
        strip_routes(grid, id, starts);
        grid.prune_deferred(id);
    }

    /// A square was removed from the map; every search that crossed it restarts.
    pub fn square_destroyed(&mut self, destroyed: &Destroyed, grid: &mut Grid) {
        for id in &destroyed.objectives {
            self.restart_search(*id, grid, &destroyed.former_neighbors);
        }
    }

    /// Retire dead objectives, discover new ones, and seed every objective
    /// whose destination still lacks a route.
    pub fn refresh(
        &mut self,
        grid: &mut Grid,
        items: &ItemLedger,
        roster: &mut Roster,
        queue: &mut SearchQueue,
    ) -> Result<CatalogSummary> {
        let mut summary = CatalogSummary {
            retired: self.retire_invalid(grid, roster),
            ..CatalogSummary::default()
        };

        let mut discovered = Vec::new();
        for food in items.food_squares(grid) {
            let Some(item) = grid.square(food).and_then(|s| s.item) else {
                continue;
            };
            for neighbor in grid.neighbors(food) {
                discovered.push((ObjectiveKind::Eat { food, item: item.id }, *neighbor));
            }
        }
        for square in grid.observed().filter(|s| grid.is_frontier(*s)) {
            if !grid.is_visited(square) {
                discovered.push((ObjectiveKind::Explore, square));
            }
        }
        for (kind, destination) in discovered {
            if self.register(kind, destination).is_some() {
                summary.created += 1;
            }
        }

        let unseeded: Vec<ObjectiveId> = self
            .objectives
            .values()
            .filter(|o| {
                !o.seed_pending
                    && grid
                        .square(o.destination)
                        .is_some_and(|s| !s.routes.contains_key(&o.id))
            })
            .map(|o| o.id)
            .collect();
        for id in unseeded {
            self.seed(id, grid, queue)?;
            summary.seeded += 1;
        }

        summary.live = self.len();
        for objective in self.objectives.values() {
            match objective.kind {
                ObjectiveKind::Eat { .. } => summary.eat += 1,
                ObjectiveKind::Explore => summary.explore += 1,
                ObjectiveKind::Wander => {}
            }
        }
        Ok(summary)
    }
}

/// Remove `objective` from route tables, flooding outward from `starts`
/// through neighbors and stopping at any square that lacks the key.
/// Returns the number of route entries removed.
pub fn strip_routes(
    grid: &mut Grid,
    objective: ObjectiveId,
    starts: impl IntoIterator<Item = SquareId>,
) -> usize {
    let mut stack: Vec<SquareId> = starts.into_iter().collect();
    let mut stripped = 0;
    while let Some(square) = stack.pop() {
        let Some(cell) = grid.square_mut(square) else {
            continue;
        };
        if cell.routes.remove(&objective).is_none() {
            continue;
        }
        stripped += 1;
        stack.extend_from_slice(cell.neighbors());
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use foray_core::route::Route;
    use foray_core::types::{ItemKind, Location};

    fn open_grid(rows: usize, cols: usize) -> Grid {
        let mut grid = Grid::new(rows, cols, 1).unwrap();
        for index in 0..rows * cols {
            grid.observe(SquareId(index));
        }
        grid
    }

    #[test]
    fn one_objective_per_kind_and_destination() {
        let mut catalog = Catalog::new(Priorities::default());
        let dest = SquareId(4);
        let first = catalog.register(ObjectiveKind::Explore, dest);
        assert!(first.is_some());
        assert_eq!(catalog.register(ObjectiveKind::Explore, dest), None);
        assert_eq!(catalog.register(ObjectiveKind::Wander, dest), None);
        let eat = catalog.register(ObjectiveKind::Eat { food: SquareId(5), item: ItemId(0) }, dest);
        assert!(eat.is_some());
        assert_eq!(catalog.find(ObjectiveKind::Explore, dest), first);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn refresh_creates_eat_objectives_around_food() {
        let mut grid = open_grid(5, 5);
        let mut items = ItemLedger::new();
        let mut roster = Roster::new();
        let mut queue = SearchQueue::new(10);
        let mut catalog = Catalog::new(Priorities::default());
        let food = grid.id_of(Location::new(2, 2));
        items.sense(&mut grid, food, ItemKind::Food, 1).unwrap();

        let summary = catalog.refresh(&mut grid, &items, &mut roster, &mut queue).unwrap();
        assert_eq!(summary.eat, 4);
        assert_eq!(summary.explore, 0);
        assert_eq!(summary.created, 4);
        assert_eq!(summary.seeded, 4);
        assert_eq!(queue.len(), 4);
        assert!(catalog.iter().all(|o| o.is_seed_pending()));

        // nothing new and every seed still in flight
        let again = catalog.refresh(&mut grid, &items, &mut roster, &mut queue).unwrap();
        assert_eq!(again.created, 0);
        assert_eq!(again.seeded, 0);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn seed_on_unobserved_destination_is_deferred() {
        let mut grid = Grid::new(6, 6, 1).unwrap();
        let mut queue = SearchQueue::new(10);
        let mut catalog = Catalog::new(Priorities::default());
        let dest = SquareId(7);
        let id = catalog.register(ObjectiveKind::Explore, dest).unwrap();
        catalog.seed(id, &mut grid, &mut queue).unwrap();
        assert!(queue.is_empty());
        assert_eq!(grid.square(dest).unwrap().deferred().len(), 1);
    }

    #[test]
    fn retirement_strips_routes_and_frees_pursuers() {
        let mut grid = open_grid(4, 4);
        let mut roster = Roster::new();
        let mut catalog = Catalog::new(Priorities::default());
        let dest = grid.id_of(Location::new(0, 0));
        let id = catalog.register(ObjectiveKind::Explore, dest).unwrap();

        // a connected patch of routes around the destination
        let patch = [Location::new(0, 0), Location::new(0, 1), Location::new(1, 1)];
        for loc in patch {
            let sq = grid.id_of(loc);
            grid.square_mut(sq).unwrap().routes.insert(id, Route::empty());
        }
        let home = grid.id_of(Location::new(1, 1));
        let agent = roster.spawn(&mut grid, home, 1).unwrap();
        roster.get_mut(agent).unwrap().objective = Some(id);
        catalog.add_pursuer(id, agent);

        catalog.retire(id, &mut grid, &mut roster).unwrap();
        assert!(grid.squares().all(|s| !s.routes.contains_key(&id)));
        assert_eq!(roster.get(agent).unwrap().objective, None);
        assert!(catalog.get(id).is_none());
        assert_eq!(catalog.find(ObjectiveKind::Explore, dest), None);
    }

    #[test]
    fn retirement_drops_parked_nodes() {
        let mut grid = Grid::new(6, 6, 1).unwrap();
        let mut roster = Roster::new();
        let mut queue = SearchQueue::new(10);
        let mut catalog = Catalog::new(Priorities::default());
        let gone = catalog.register(ObjectiveKind::Explore, SquareId(7)).unwrap();
        let kept = catalog.register(ObjectiveKind::Explore, SquareId(20)).unwrap();
        catalog.seed(gone, &mut grid, &mut queue).unwrap();
        catalog.seed(kept, &mut grid, &mut queue).unwrap();
        let stray = SearchNode::seed(SquareId(7), gone, 0).extend_to(SquareId(8));
        grid.defer(SquareId(8), stray);
        assert_eq!(grid.parked_count(), 3);

        catalog.retire(gone, &mut grid, &mut roster).unwrap();
        assert_eq!(grid.parked_count(), 1);
        assert_eq!(grid.square(SquareId(20)).unwrap().deferred()[0].objective, kept);
    }

    #[test]
    fn restarted_search_drops_old_parked_nodes() {
        let mut grid = Grid::new(6, 6, 1).unwrap();
        let mut queue = SearchQueue::new(10);
        let mut catalog = Catalog::new(Priorities::default());
        let id = catalog.register(ObjectiveKind::Explore, SquareId(7)).unwrap();
        catalog.seed(id, &mut grid, &mut queue).unwrap();
        assert_eq!(grid.parked_count(), 1);

        catalog.restart_search(id, &mut grid, &[]);
        assert_eq!(grid.parked_count(), 0);
        assert_eq!(catalog.get(id).unwrap().generation, 1);

        catalog.seed(id, &mut grid, &mut queue).unwrap();
        let parked = grid.square(SquareId(7)).unwrap().deferred();
        assert_eq!(parked.len(), 1);
        assert_eq!(parked[0].generation, 1);
    }

    #[test]
    fn explore_is_valid_only_on_unvisited_frontier() {
        let mut grid = Grid::new(8, 8, 2).unwrap();
        let mut catalog = Catalog::new(Priorities::default());
        let center = grid.id_of(Location::new(4, 4));
        grid.visit(center);
        let edge = grid.id_of(Location::new(4, 5));
        let id = catalog.register(ObjectiveKind::Explore, edge).unwrap();
        assert!(catalog.get(id).unwrap().is_valid(&grid));
        grid.visit(edge);
        assert!(!catalog.get(id).unwrap().is_valid(&grid));
    }

    #[test]
    fn eat_follows_the_specific_food_item() {
        let mut grid = open_grid(5, 5);
        let mut items = ItemLedger::new();
        let food = SquareId(12);
        let item = items.sense(&mut grid, food, ItemKind::Food, 1).unwrap();
        let mut catalog = Catalog::new(Priorities::default());
        let id = catalog
            .register(ObjectiveKind::Eat { food, item }, SquareId(11))
            .unwrap();
        assert!(catalog.get(id).unwrap().is_valid(&grid));
        grid.square_mut(food).unwrap().item = None;
        assert!(!catalog.get(id).unwrap().is_valid(&grid));
    }

    #[test]
    fn priorities_follow_config() {
        let priorities = Priorities::default();
        let eat = ObjectiveKind::Eat { food: SquareId(0), item: ItemId(0) };
        assert!(eat.priority(&priorities) > ObjectiveKind::Explore.priority(&priorities));
        let explore = ObjectiveKind::Explore.priority(&priorities);
        assert!(explore > ObjectiveKind::Wander.priority(&priorities));
    }
}
