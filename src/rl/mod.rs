//! Reinforcement learning interface for the coverage environment
//!
//! Provides:
//! - Local-view observations (self, seen, other agents, walls)
//! - Burn-compatible multi-agent environment interface
//! - Backend-agnostic tensor operations

pub mod backend;
pub mod environment;
pub mod observation;

pub use backend::{ObservationBackend, default_device};
pub use environment::CoverageEnvironment;
pub use observation::{agent_observation, create_observation, local_view};
