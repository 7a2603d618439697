//! Grid Coverage - a multi-agent grid exploration environment
//!
//! This library provides:
//! - Core simulation: topology, world state, rewards and the step engine (game module)
//! - Tensor observations and an RL environment interface (rl module)
//! - PNG frames and TUI rendering (render module)
//! - Execution modes (run, visualize, human)

pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use error::{GridError, Result};
pub use game::{Action, EnvConfig, GridEngine, RewardConfig, Topology};
pub use rl::CoverageEnvironment;
