//! Friendly agents and the roster that tracks them across turns.
//!
//! Agents are stored by id in a `BTreeMap` so every pass over the roster
//! (and therefore order selection) runs in a stable, reproducible order.

use foray_core::error::{InvariantError, Result};
use foray_core::grid::Grid;
use foray_core::types::{AgentId, Direction, ObjectiveId, SquareId, Tick};
use serde::Serialize;
use std::collections::BTreeMap;

/// One friendly agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: AgentId,
    /// Square the agent stands on this turn.
    pub square: SquareId,
    /// Square it will stand on next turn; equals `square` until ordered.
    pub next_square: SquareId,
    /// Objective the agent is currently pursuing.
    pub objective: Option<ObjectiveId>,
    /// Last turn the game engine reported this agent.
    pub last_sensed: Tick,
}

/// All friendly agents of a game.
#[derive(Debug, Default)]
pub struct Roster {
    agents: BTreeMap<AgentId, Agent>,
    next_id: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Agent ids in ascending order.
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Register a new agent standing on `square`.
    pub fn spawn(&mut self, grid: &mut Grid, square: SquareId, turn: Tick) -> Result<AgentId> {
        let location = grid.location(square);
        let cell = grid
            .square_mut(square)
            .ok_or(InvariantError::MissingSquare(location))?;
        let id = AgentId(self.next_id);
        self.next_id += 1;
        cell.agent = Some(id);
        cell.next_agent = Some(id);
        self.agents.insert(
            id,
            Agent {
                id,
                square,
                next_square: square,
                objective: None,
                last_sensed: turn,
            },
        );
        tracing::debug!(agent = id.0, row = location.row, col = location.col, "agent spawned");
        Ok(id)
    }

    /// Move every agent onto the square it was ordered to last turn.
    ///
    /// Agents whose destination no longer exists are dropped and returned.
    pub fn advance(&mut self, grid: &mut Grid) -> Vec<Agent> {
        let mut lost = Vec::new();
        self.agents.retain(|_, agent| {
            agent.square = agent.next_square;
            match grid.square_mut(agent.square) {
                Some(cell) => {
                    cell.agent = Some(agent.id);
                    cell.next_agent = Some(agent.id);
                    true
                }
                None => {
                    lost.push(agent.clone());
                    false
                }
            }
        });
        lost
    }

    /// Record that the game engine reported this agent this turn.
    pub fn sense(&mut self, id: AgentId, turn: Tick) {
        if let Some(agent) = self.agents.get_mut(&id) {
            agent.last_sensed = turn;
        }
    }

    /// Agents the game engine did not report on `turn`.
    pub fn unsensed(&self, turn: Tick) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|a| a.last_sensed != turn)
            .map(|a| a.id)
            .collect()
    }

    /// Forget an agent and clear its occupancy marks.
    pub fn remove(&mut self, grid: &mut Grid, id: AgentId) -> Option<Agent> {
        let agent = self.agents.remove(&id)?;
        for square in [agent.square, agent.next_square] {
            if let Some(cell) = grid.square_mut(square) {
                if cell.agent == Some(id) {
                    cell.agent = None;
                }
                if cell.next_agent == Some(id) {
                    cell.next_agent = None;
                }
            }
        }
        Some(agent)
    }

    /// Order an agent one step onto an adjacent square and reserve it.
    ///
    /// The square the agent leaves stays reserved for the rest of the turn,
    /// so no other agent moves into it behind its back.
    pub fn order_to(
        &mut self,
        grid: &mut Grid,
        id: AgentId,
        target: SquareId,
    ) -> Result<Direction> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(InvariantError::UnknownAgent(id))?;
        let direction = grid.direction_between(agent.square, target).ok_or_else(|| {
            InvariantError::NonAdjacentOrder {
                from: grid.location(agent.square),
                to: grid.location(target),
            }
        })?;
        let location = grid.location(target);
        let cell = grid
            .square_mut(target)
            .ok_or(InvariantError::MissingSquare(location))?;
        cell.next_agent = Some(id);
        agent.next_square = target;
        Ok(direction)
    }
}
