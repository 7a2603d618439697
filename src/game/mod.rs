//! Core simulation for multi-agent grid coverage
//!
//! This module contains the world state, reward rules and step orchestration
//! without any I/O, tensor or rendering dependencies.

pub mod action;
pub mod config;
pub mod engine;
pub mod reward;
pub mod state;
pub mod topology;

// Re-export commonly used types
pub use action::{Action, ActionSpace, NUM_ACTIONS};
pub use config::{EnvConfig, RewardConfig};
pub use engine::{AgentInfo, EpisodePhase, GridEngine, Reward, StepInfo, StepResult};
pub use reward::{EpisodeCounters, MoveKind, MoveOutcome, RewardEngine};
pub use state::{Agent, AgentId, Coverage, Position, SeenCell, TrailSegment, Wall, World};
pub use topology::{CellCode, Topology};
