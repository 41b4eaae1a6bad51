//! Order selector — turns route tables into one move per agent.
//!
//! Each agent looks only at its own square's route table. It keeps the
//! objective it already pursues while that objective is valid and routed from
//! its square, holding in place when the next hop is taken. Otherwise it
//! takes the best objective whose next hop is free, and failing that it
//! wanders. Agents are processed in id order and every move reserves its
//! target square, so later agents route around earlier ones.

use crate::agent::Roster;
use crate::objective::{Catalog, ObjectiveKind};
use foray_core::error::Result;
use foray_core::grid::{Grid, Square};
use foray_core::route::Route;
use foray_core::types::{AgentId, Direction, Location, ObjectiveId, SquareId};
use rand::Rng;
use serde::Serialize;

/// A single-step move for one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub agent: AgentId,
    pub from: Location,
    pub to: Location,
    pub direction: Direction,
    pub kind: ObjectiveKind,
    pub objective: Option<ObjectiveId>,
}

/// Orders for one turn plus how agents split between pursuits.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub orders: Vec<Order>,
    pub pursuing: usize,
    pub wandering: usize,
    /// Agents that did not move.
    pub holding: usize,
}

/// Squares an agent must not step onto: reserved by an agent for next turn,
/// holding food, or holding one of our hills.
pub fn is_blocked(square: &Square) -> bool {
    square.next_agent.is_some() || square.has_food() || square.has_friendly_hill()
}

/// Neighbors of `square` that are not blocked.
pub fn passable_neighbors(grid: &Grid, square: SquareId) -> Vec<SquareId> {
    grid.neighbors(square)
        .iter()
        .copied()
        .filter(|n| grid.square(*n).is_some_and(|s| !is_blocked(s)))
        .collect()
}

/// Route toward `objective` from `square`, if the objective is live and the
/// route is either empty or starts on a passable square.
fn admissible(
    grid: &Grid,
    catalog: &Catalog,
    square: SquareId,
    objective: ObjectiveId,
    passable: &[SquareId],
) -> Option<Route> {
    if !catalog.get(objective)?.is_valid(grid) {
        return None;
    }
    let route = grid.square(square)?.routes.get(&objective)?;
    match route.first() {
        None => Some(route.clone()),
        Some(next) if passable.contains(&next) => Some(route.clone()),
        Some(_) => None,
    }
}

/// Best admissible objective in `square`'s route table: highest priority,
/// then shortest route, then lowest objective id.
pub fn best_objective(
    grid: &Grid,
    catalog: &Catalog,
    square: SquareId,
    passable: &[SquareId],
) -> Option<(ObjectiveId, Route)> {
    let cell = grid.square(square)?;
    cell.routes
        .keys()
        .filter_map(|id| {
            let route = admissible(grid, catalog, square, *id, passable)?;
            let priority = catalog.get(*id)?.priority;
            Some((priority, *id, route))
        })
        .min_by(|(pa, ia, ra), (pb, ib, rb)| {
            pb.total_cmp(pa)
                .then(ra.len().cmp(&rb.len()))
                .then(ia.cmp(ib))
        })
        .map(|(_, id, route)| (id, route))
}

/// One-hop route to a random passable neighbor, favoring open squares and
/// squares no agent has stood on yet. Empty when nothing is passable.
pub fn wander_route<R: Rng>(
    grid: &Grid,
    square: SquareId,
    passable: &[SquareId],
    rng: &mut R,
    unvisited_bonus: f64,
) -> Route {
    let mut best: Option<(f64, SquareId)> = None;
    for &neighbor in passable {
        let openness = passable_neighbors(grid, neighbor).len() as f64;
        let mut score = rng.gen::<f64>() * openness;
        if !grid.is_visited(neighbor) {
            score += unvisited_bonus;
        }
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, neighbor));
        }
    }
    best.map(|(_, neighbor)| Route::empty().prepend(neighbor))
        .unwrap_or_default()
}

/// Choose and issue this turn's moves.
pub fn select_orders<R: Rng>(
    grid: &mut Grid,
    catalog: &mut Catalog,
    roster: &mut Roster,
    rng: &mut R,
    unvisited_bonus: f64,
) -> Result<Selection> {
    let mut selection = Selection::default();

    for id in roster.ids() {
        let Some(agent) = roster.get(id) else {
            continue;
        };
        let square = agent.square;
        let previous = agent.objective;
        let passable = passable_neighbors(grid, square);

        let kept = previous.and_then(|obj| {
            let valid = catalog.get(obj).is_some_and(|o| o.is_valid(grid));
            let route = grid.square(square)?.routes.get(&obj)?;
            valid.then(|| (obj, route.clone()))
        });
        let chosen = kept.or_else(|| best_objective(grid, catalog, square, &passable));

        let (kind, objective, route) = match chosen {
            Some((obj, route)) => {
                let kind = catalog.get(obj).map_or(ObjectiveKind::Wander, |o| o.kind);
                selection.pursuing += 1;
                (kind, Some(obj), route)
            }
            None => {
                selection.wandering += 1;
                let route = wander_route(grid, square, &passable, rng, unvisited_bonus);
                (ObjectiveKind::Wander, None, route)
            }
        };

        if previous != objective {
            if let Some(old) = previous {
                catalog.remove_pursuer(old, id);
            }
            if let Some(new) = objective {
                catalog.add_pursuer(new, id);
            }
            if let Some(agent) = roster.get_mut(id) {
                agent.objective = objective;
            }
        }

        match route.first() {
            Some(next) if passable.contains(&next) => {
                let direction = roster.order_to(grid, id, next)?;
                selection.orders.push(Order {
                    agent: id,
                    from: grid.location(square),
                    to: grid.location(next),
                    direction,
                    kind,
                    objective,
                });
            }
            _ => selection.holding += 1,
        }
    }

    Ok(selection)
}
