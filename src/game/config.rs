use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Reward table and optional shaping rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Penalty for trying to leave the grid
    pub illegal: f64,
    /// Bonus for discovering a cell
    pub new_cell: f64,
    /// Bonus for discovering a cell that borders known territory
    pub adjacency: f64,
    /// Cost of an accepted move
    pub movement: f64,
    /// Cost of staying in place
    pub wait: f64,
    /// Penalty for bumping into a wall or another agent
    pub collision: f64,
    /// One-off bonus when the last explorable cell is discovered
    pub goal: f64,
    /// Reward moving towards windows with more unexplored cells (±0.5)
    pub exploration_delta: bool,
    /// Penalise repeated visits of the same cell with -0.5 × visit count
    pub escalating_revisit: bool,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            illegal: -0.5,
            new_cell: 1.0,
            adjacency: 1.0,
            movement: -0.05,
            wait: -0.1,
            collision: -20.0,
            goal: 100.0,
            exploration_delta: false,
            escalating_revisit: false,
        }
    }
}

/// Configuration for a coverage environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Channels per observed cell (at least 4)
    pub n_channels: usize,
    /// Half-width of each agent's square view
    pub view_radius: usize,
    /// End the episode after `round(factor × total_cells)` steps without discovery.
    /// `None` or `0` disables the limit.
    pub traversal_limit_factor: Option<f64>,
    /// Give every agent the team total instead of a single scalar
    pub shared_reward: bool,
    /// Keep running after collisions (evaluation runs)
    pub test_mode: bool,
    pub rewards: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            n_channels: 4,
            view_radius: 1,
            traversal_limit_factor: None,
            shared_reward: false,
            test_mode: false,
            rewards: RewardConfig::default(),
        }
    }
}

impl EnvConfig {
    pub fn new(n_channels: usize, view_radius: usize, traversal_limit_factor: Option<f64>) -> Self {
        Self {
            n_channels,
            view_radius,
            traversal_limit_factor,
            ..Default::default()
        }
    }

    /// Side length of an agent's observation window
    pub fn view_size(&self) -> usize {
        2 * self.view_radius + 1
    }

    /// Active traversal-limit factor, if any
    pub fn traversal_limit(&self) -> Option<f64> {
        self.traversal_limit_factor.filter(|&f| f != 0.0)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.n_channels < 4 {
            return Err(GridError::InvalidConfig(format!(
                "n_channels must be at least 4, got {}",
                self.n_channels
            )));
        }

        if let Some(factor) = self.traversal_limit_factor {
            if !factor.is_finite() || factor < 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "traversal_limit_factor must be a non-negative number, got {factor}"
                )));
            }
        }

        Ok(())
    }
}
