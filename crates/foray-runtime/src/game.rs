//! Game — everything one game needs, owned in one place.
//!
//! A turn runs in two halves. While the engine's records stream in,
//! [`Game::begin_turn`] and [`Game::apply`] update the map, items and agents.
//! When the engine says `go`, [`Game::play_turn`] runs the pipeline:
//!
//! 1. Agents and items that went unreported are dropped
//! 2. Every agent's square is visited, observing what it can see
//! 3. Search nodes parked on newly observed squares rejoin the queue
//! 4. The catalog retires dead objectives and seeds new ones
//! 5. The shared search drains until its share of the turn time is used up
//! 6. Each agent picks a move from its square's route table

use crate::agent::Roster;
use crate::config::EngineConfig;
use crate::deferred;
use crate::frontier::{self, DrainSummary};
use crate::items::ItemLedger;
use crate::objective::{Catalog, CatalogSummary};
use crate::protocol::{GameSettings, Record};
use crate::selector::{self, Order};
use crate::stats::TurnStats;
use foray_core::error::{ProtocolError, Result};
use foray_core::grid::Grid;
use foray_core::search::SearchQueue;
use foray_core::types::{AgentId, ItemKind, Location, SquareId, Tick, FRIENDLY};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Everything that happened in one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub turn: Tick,
    pub orders: Vec<Order>,
    pub pursuing: usize,
    pub wandering: usize,
    pub holding: usize,
    pub newly_observed: usize,
    pub readmitted: usize,
    /// Search nodes still waiting on unobserved squares after the drain.
    pub parked: usize,
    pub vanished_agents: usize,
    pub vanished_items: usize,
    pub catalog: CatalogSummary,
    pub search: DrainSummary,
    pub stats: TurnStats,
    pub elapsed_ms: f64,
}

/// Per-game engine context.
pub struct Game {
    settings: GameSettings,
    config: EngineConfig,
    grid: Grid,
    catalog: Catalog,
    queue: SearchQueue,
    roster: Roster,
    items: ItemLedger,
    rng: ChaCha8Rng,
    turn: Tick,
    turn_started: Instant,
}

impl Game {
    pub fn new(settings: GameSettings, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or(settings.player_seed);
        // no route on a torus is longer than rows + cols
        let radius = config.max_search_radius.min(settings.rows.saturating_add(settings.cols));
        tracing::info!(
            rows = settings.rows,
            cols = settings.cols,
            view_radius2 = settings.view_radius2,
            turntime_ms = settings.turntime_ms,
            seed,
            "new game"
        );
        Ok(Self {
            grid: Grid::new(settings.rows, settings.cols, settings.view_radius2)?,
            catalog: Catalog::new(config.priorities.clone()),
            queue: SearchQueue::new(radius),
            roster: Roster::new(),
            items: ItemLedger::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            turn: 0,
            turn_started: Instant::now(),
            settings,
            config,
        })
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn items(&self) -> &ItemLedger {
        &self.items
    }

    pub fn queue(&self) -> &SearchQueue {
        &self.queue
    }

    pub fn turn(&self) -> Tick {
        self.turn
    }

    /// Start turn `turn`: agents step onto the squares they were ordered to.
    pub fn begin_turn(&mut self, turn: Tick) -> Result<()> {
        let expected = self.turn + 1;
        if turn != expected {
            return Err(ProtocolError::TurnOutOfSequence { expected, found: turn }.into());
        }
        self.turn = turn;
        self.turn_started = Instant::now();
        self.grid.reset_occupancy();
        for agent in self.roster.advance(&mut self.grid) {
            tracing::warn!(agent = agent.id.0, "agent walked off the map");
            if let Some(objective) = agent.objective {
                self.catalog.remove_pursuer(objective, agent.id);
            }
        }
        Ok(())
    }

    /// Apply one map record of the current turn.
    pub fn apply(&mut self, record: &Record) -> Result<()> {
        let Some(location) = record.location() else {
            return Ok(());
        };
        let square = self.square_at(location)?;
        match *record {
            Record::Water(_) => {
                if let Some(destroyed) = self.grid.destroy(square) {
                    self.items.forget(square);
                    self.catalog.square_destroyed(&destroyed, &mut self.grid);
                }
            }
            Record::Food(_) => {
                if self.grid.exists(square) {
                    self.items.sense(&mut self.grid, square, ItemKind::Food, self.turn)?;
                }
            }
            Record::Hill(_, owner) => {
                if self.grid.exists(square) {
                    self.items.sense(&mut self.grid, square, ItemKind::Hill { owner }, self.turn)?;
                }
            }
            Record::Ant(_, FRIENDLY) => self.sense_friend(square, location)?,
            Record::Ant(_, owner) => {
                if let Some(cell) = self.grid.square_mut(square) {
                    cell.enemy = Some(owner);
                }
            }
            Record::DeadAnt(_, FRIENDLY) => {
                let dead = self.grid.square(square).and_then(|s| s.agent);
                if let Some(agent) = dead {
                    tracing::debug!(
                        agent = agent.0,
                        row = location.row,
                        col = location.col,
                        "agent died"
                    );
                    self.drop_agent(agent);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Run the turn pipeline with the configured share of the turn time.
    pub fn play_turn(&mut self) -> Result<TurnReport> {
        let budget = self.settings.turntime_ms as f64 * self.config.search_budget_fraction;
        let deadline = self.turn_started + Duration::from_secs_f64(budget / 1000.0);
        self.play_turn_until(deadline)
    }

    /// Run the turn pipeline, stopping the search at `deadline`.
    pub fn play_turn_until(&mut self, deadline: Instant) -> Result<TurnReport> {
        let vanished_agents = self.roster.unsensed(self.turn);
        for agent in &vanished_agents {
            self.drop_agent(*agent);
        }
        let vanished_items = self.items.remove_unsensed(&mut self.grid, self.turn);

        let mut newly_observed = Vec::new();
        let squares: Vec<SquareId> = self.roster.iter().map(|a| a.square).collect();
        for square in squares {
            newly_observed.extend(self.grid.visit(square));
        }
        let readmitted = deferred::readmit(&mut self.grid, &mut self.queue, &newly_observed)?;

        let catalog = self
            .catalog
            .refresh(&mut self.grid, &self.items, &mut self.roster, &mut self.queue)?;
        let search = frontier::drain(&mut self.grid, &mut self.catalog, &mut self.queue, deadline)?;
        let selection = selector::select_orders(
            &mut self.grid,
            &mut self.catalog,
            &mut self.roster,
            &mut self.rng,
            self.config.wander_unvisited_bonus,
        )?;
        let parked = deferred::parked(&self.grid);
        let stats = TurnStats::collect(self.turn, &self.grid, &self.items, &self.roster);
        let elapsed_ms = self.turn_started.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            turn = self.turn,
            agents = self.roster.len(),
            orders = selection.orders.len(),
            objectives = catalog.live,
            elapsed_ms,
            "turn played"
        );
        tracing::debug!(
            turn = self.turn,
            newly_observed = newly_observed.len(),
            readmitted,
            created = catalog.created,
            retired = catalog.retired,
            popped = search.popped,
            recorded = search.recorded,
            remaining = search.remaining,
            timed_out = search.timed_out,
            parked,
            observed = stats.counts.observed,
            seen = stats.observed_fraction(),
            "turn detail"
        );
        tracing::trace!(turn = self.turn, map = %self.grid.render(), "map");

        Ok(TurnReport {
            turn: self.turn,
            pursuing: selection.pursuing,
            wandering: selection.wandering,
            holding: selection.holding,
            orders: selection.orders,
            newly_observed: newly_observed.len(),
            readmitted,
            parked,
            vanished_agents: vanished_agents.len(),
            vanished_items: vanished_items.len(),
            catalog,
            search,
            stats,
            elapsed_ms,
        })
    }

    fn square_at(&self, location: Location) -> Result<SquareId> {
        if !self.grid.contains(location.row, location.col) {
            return Err(ProtocolError::OutOfBounds {
                row: location.row,
                col: location.col,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            }
            .into());
        }
        Ok(self.grid.id_of(location))
    }

    /// A friendly agent was reported on `square`: either one we know, or a new
    /// one emerging from our hill.
    fn sense_friend(&mut self, square: SquareId, location: Location) -> Result<()> {
        let (known, on_hill) = match self.grid.square(square) {
            Some(cell) => (cell.agent, cell.has_friendly_hill()),
            None => (None, false),
        };
        match (known, on_hill) {
            (Some(agent), _) => self.roster.sense(agent, self.turn),
            (None, true) => {
                self.roster.spawn(&mut self.grid, square, self.turn)?;
            }
            (None, false) => return Err(ProtocolError::UnknownAgent(location).into()),
        }
        Ok(())
    }

    fn drop_agent(&mut self, id: AgentId) {
        if let Some(agent) = self.roster.remove(&mut self.grid, id) {
            if let Some(objective) = agent.objective {
                self.catalog.remove_pursuer(objective, id);
            }
        }
    }
}
