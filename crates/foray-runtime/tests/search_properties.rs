//! Properties of the shared frontier search and the route tables it writes.
//!
//! Each test builds a small map by hand, drives the catalog and the drain
//! directly, and inspects the route tables afterwards.

use foray_runtime::agent::Roster;
use foray_runtime::deferred;
use foray_runtime::frontier::drain;
use foray_runtime::items::ItemLedger;
use foray_runtime::prelude::*;
use std::time::{Duration, Instant};

fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(60)
}

fn open_grid(rows: usize, cols: usize) -> Grid {
    let mut grid = Grid::new(rows, cols, 1).unwrap();
    for index in 0..rows * cols {
        grid.observe(SquareId(index));
    }
    grid
}

/// Food at `food`, one Eat objective at `dest`, its seed queued.
fn single_eat(
    grid: &mut Grid,
    food: Location,
    dest: Location,
    radius: usize,
) -> (Catalog, SearchQueue, ObjectiveId) {
    let food = grid.id_of(food);
    let dest = grid.id_of(dest);
    let item = ItemLedger::new().sense(grid, food, ItemKind::Food, 1).unwrap();
    let mut catalog = Catalog::new(Priorities::default());
    let mut queue = SearchQueue::new(radius);
    let id = catalog.register(ObjectiveKind::Eat { food, item }, dest).unwrap();
    catalog.seed(id, grid, &mut queue).unwrap();
    (catalog, queue, id)
}

/// Every hop of `route` from `start` is a step onto an adjacent square.
fn assert_connected(grid: &Grid, start: SquareId, route: &Route) {
    let mut at = start;
    for hop in route.iter() {
        assert!(
            grid.neighbors(at).contains(&hop),
            "{:?} -> {:?} is not a single step",
            grid.location(at),
            grid.location(hop)
        );
        at = hop;
    }
}

#[test]
fn routes_are_shortest_on_an_open_torus() {
    let mut grid = open_grid(5, 5);
    let (mut catalog, mut queue, id) =
        single_eat(&mut grid, Location::new(2, 2), Location::new(2, 3), 16);
    let dest = grid.id_of(Location::new(2, 3));

    let summary = drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();
    assert_eq!(summary.recorded, 25);

    for square in grid.squares() {
        let route = &square.routes[&id];
        assert_eq!(
            route.len(),
            grid.hop_distance(square.id, dest),
            "route length at {:?}",
            square.location
        );
        if square.id == dest {
            assert!(route.is_empty());
        } else {
            assert_eq!(route.last(), Some(dest));
        }
        assert_connected(&grid, square.id, route);
    }
}

#[test]
fn first_route_written_is_kept() {
    let mut grid = open_grid(5, 5);
    let (mut catalog, mut queue, id) =
        single_eat(&mut grid, Location::new(0, 0), Location::new(0, 1), 16);
    drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();

    let watched = grid.id_of(Location::new(3, 3));
    let before = grid.square(watched).unwrap().routes[&id].clone();

    // a longer, still-valid route for the same square and objective
    let detour = Route::from_iter([
        grid.id_of(Location::new(3, 4)),
        grid.id_of(Location::new(2, 4)),
        grid.id_of(Location::new(1, 4)),
        grid.id_of(Location::new(0, 4)),
        grid.id_of(Location::new(0, 0)),
        grid.id_of(Location::new(0, 1)),
    ]);
    queue
        .push(SearchNode {
            square: watched,
            objective: id,
            generation: 0,
            route: detour,
        })
        .unwrap();
    let summary = drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();

    assert_eq!(summary.discarded, 1);
    assert_eq!(grid.square(watched).unwrap().routes[&id], before);
}

#[test]
fn retired_objective_leaves_no_routes() {
    let mut grid = open_grid(6, 6);
    let food = Location::new(3, 3);
    let (mut catalog, mut queue, id) = single_eat(&mut grid, food, Location::new(3, 4), 3);
    drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();
    assert!(grid.squares().filter(|s| s.routes.contains_key(&id)).count() > 1);

    let food = grid.id_of(food);
    grid.square_mut(food).unwrap().item = None;
    let mut roster = Roster::new();
    assert_eq!(catalog.retire_invalid(&mut grid, &mut roster), 1);

    assert!(catalog.get(id).is_none());
    assert!(grid.squares().all(|s| !s.routes.contains_key(&id)));
}

#[test]
fn destroyed_square_restarts_the_search() {
    let mut grid = open_grid(5, 5);
    let (mut catalog, mut queue, id) =
        single_eat(&mut grid, Location::new(0, 0), Location::new(2, 0), 16);
    drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();

    let wall = grid.id_of(Location::new(2, 2));
    let destroyed = grid.destroy(wall).unwrap();
    assert_eq!(destroyed.objectives, vec![id]);
    catalog.square_destroyed(&destroyed, &mut grid);

    assert!(grid.squares().all(|s| !s.routes.contains_key(&id)));
    assert_eq!(catalog.get(id).unwrap().generation, 1);

    // nodes still queued from the old search are ignored, a fresh seed rebuilds
    catalog.seed(id, &mut grid, &mut queue).unwrap();
    drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();
    for square in grid.squares() {
        let route = &square.routes[&id];
        assert!(route.iter().all(|hop| hop != wall));
        assert_connected(&grid, square.id, route);
    }
}

#[test]
fn parked_nodes_resume_when_their_square_is_seen() {
    // a 1x8 ring: only the left half is observed at first
    let mut grid = Grid::new(1, 8, 1).unwrap();
    for col in 0..4 {
        grid.observe(SquareId(col));
    }
    let (mut catalog, mut queue, id) =
        single_eat(&mut grid, Location::new(0, 0), Location::new(0, 1), 16);
    let summary = drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();
    assert_eq!(summary.recorded, 4);

    let hidden = SquareId(4);
    assert!(grid.square(hidden).unwrap().routes.is_empty());
    assert_eq!(grid.square(hidden).unwrap().deferred().len(), 1);
    assert!(queue.is_empty());

    // the square comes into view this turn and its node rejoins the queue
    assert!(grid.observe(hidden));
    let readmitted = deferred::readmit(&mut grid, &mut queue, &[hidden]).unwrap();
    assert_eq!(readmitted, 1);
    assert_eq!(queue.len(), 1);

    drain(&mut grid, &mut catalog, &mut queue, far_future()).unwrap();
    let route = &grid.square(hidden).unwrap().routes[&id];
    assert_eq!(route.len(), 3);
    assert_connected(&grid, hidden, route);
}
