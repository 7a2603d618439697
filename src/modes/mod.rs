pub mod human;
pub mod run;
mod terminal;
pub mod visualize;

pub use human::HumanMode;
pub use run::{EpisodeSummary, RunMode, RunOptions, format_episode};
pub use visualize::{VisualizationSpeed, VisualizeMode};
