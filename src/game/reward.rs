//! Per-agent move resolution and reward shaping
//!
//! Rules are checked in strict precedence and stop at the first match:
//! illegal move, collision, then accepted move (new or already seen cell).

use std::collections::HashMap;

use tracing::debug;

use super::config::RewardConfig;
use super::state::{AgentId, Position, World};

/// Magnitude of the exploration-delta shaping term
pub const EXPLORATION_DELTA: f64 = 0.5;
/// Penalty step per repeated visit of the same cell
pub const REVISIT_PENALTY_STEP: f64 = 0.5;

/// Episode-scoped bookkeeping shared by all agents
#[derive(Debug, Clone, Default)]
pub struct EpisodeCounters {
    /// Consecutive resolutions landing on already-seen cells, reset by any discovery
    pub stagnation: usize,
    /// Whether the goal bonus was paid this episode
    pub goal_granted: bool,
    revisits: HashMap<Position, u32>,
}

impl EpisodeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often an already-seen cell was revisited (escalating-revisit rule only)
    pub fn revisits(&self, pos: Position) -> u32 {
        self.revisits.get(&pos).copied().unwrap_or(0)
    }
}

/// Which rule decided a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Target outside the grid
    Illegal,
    /// Target blocked by a wall or another agent
    Collision,
    /// Accepted onto a never-seen cell
    NewCell,
    /// Accepted onto an already-seen cell (including waiting in place)
    Revisit,
}

/// Result of resolving one agent's proposed move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub reward: f64,
    /// Position the agent ends the tick on
    pub resolved: Position,
    pub done: bool,
    pub kind: MoveKind,
}

/// Stateless reward rules; all mutation goes to the world and the episode counters
#[derive(Debug, Clone, Copy)]
pub struct RewardEngine<'a> {
    rules: &'a RewardConfig,
    test_mode: bool,
    view_radius: usize,
}

impl<'a> RewardEngine<'a> {
    pub fn new(rules: &'a RewardConfig, test_mode: bool, view_radius: usize) -> Self {
        Self {
            rules,
            test_mode,
            view_radius,
        }
    }

    /// Resolve `agent_id`'s move to `proposed`
    ///
    /// `done` is the episode flag accumulated so far this tick; the returned
    /// outcome carries it forward, possibly set.
    pub fn resolve(
        &self,
        world: &mut World,
        counters: &mut EpisodeCounters,
        agent_id: AgentId,
        proposed: Position,
        done: bool,
    ) -> MoveOutcome {
        let current = world.agent(agent_id).pos;

        if !world.is_in_bounds(proposed) {
            return MoveOutcome {
                reward: self.rules.illegal,
                resolved: current,
                done,
                kind: MoveKind::Illegal,
            };
        }

        if let Some(outcome) = self.check_collision(world, agent_id, proposed, current, done) {
            return outcome;
        }

        let mut reward = 0.0;
        let mut done = done;
        let kind = if !world.is_visited(proposed) {
            reward += self.rules.new_cell;
            world.mark_visited(proposed, agent_id);
            counters.stagnation = 0;

            if world.all_visited() {
                if !counters.goal_granted {
                    reward += self.rules.goal;
                    counters.goal_granted = true;
                    debug!(agent = agent_id, "all cells covered");
                }
                done = true;
            }

            if self.rules.exploration_delta {
                reward += self.exploration_delta(world, current, proposed);
            }

            if borders_known_territory(world, proposed, current) {
                reward += self.rules.adjacency;
            }

            MoveKind::NewCell
        } else {
            counters.stagnation += 1;

            if self.rules.escalating_revisit {
                let count = counters.revisits.entry(proposed).or_insert(0);
                *count += 1;
                reward -= REVISIT_PENALTY_STEP * *count as f64;
            }

            MoveKind::Revisit
        };

        reward += if proposed != current {
            self.rules.movement
        } else {
            self.rules.wait
        };

        MoveOutcome {
            reward,
            resolved: proposed,
            done,
            kind,
        }
    }

    /// Blocked by a wall or by an agent other than the mover
    fn check_collision(
        &self,
        world: &mut World,
        agent_id: AgentId,
        proposed: Position,
        current: Position,
        done: bool,
    ) -> Option<MoveOutcome> {
        let other = world
            .agent_at(proposed)
            .map(|a| a.id)
            .filter(|&id| id != agent_id);

        if other.is_none() && !world.has_wall_at(proposed) {
            return None;
        }

        world.agent_mut(agent_id).collided = true;
        if let Some(other_id) = other {
            world.agent_mut(other_id).collided = true;
        }
        debug!(agent = agent_id, other = ?other, ?proposed, "collision");

        Some(MoveOutcome {
            reward: self.rules.collision,
            resolved: current,
            done: done || !self.test_mode,
            kind: MoveKind::Collision,
        })
    }

    fn exploration_delta(&self, world: &World, current: Position, proposed: Position) -> f64 {
        let here = world.count_unvisited_around(current, self.view_radius);
        let there = world.count_unvisited_around(proposed, self.view_radius);
        match there.cmp(&here) {
            std::cmp::Ordering::Greater => EXPLORATION_DELTA,
            std::cmp::Ordering::Less => -EXPLORATION_DELTA,
            std::cmp::Ordering::Equal => 0.0,
        }
    }
}

/// True if any orthogonal neighbour of `target` other than `from` is a seen
/// cell, a wall, or off the grid
pub fn borders_known_territory(world: &World, target: Position, from: Position) -> bool {
    target
        .neighbours()
        .into_iter()
        .filter(|&n| n != from)
        .any(|n| !world.is_in_bounds(n) || world.is_visited(n) || world.has_wall_at(n))
}
