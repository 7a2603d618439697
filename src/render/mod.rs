pub mod frames;
pub mod palette;
pub mod png;
pub mod renderer;

pub use frames::{FrameRecorder, agent_symbol, frame_stem, render_ascii};
pub use png::render_image;
pub use renderer::{Renderer, StatusLine};
