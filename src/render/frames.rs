use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::debug;

use super::png::render_image;
use crate::error::Result;
use crate::game::{Position, World};

/// Character used for an agent on text frames
pub fn agent_symbol(id: usize) -> char {
    char::from_digit((id % 36) as u32, 36).unwrap_or('?')
}

/// Plain-text frame: `#` wall, agent id, `+` seen, `.` unseen
pub fn render_ascii(world: &World) -> String {
    let mut out = String::with_capacity(world.rows() * (world.cols() + 1));
    for row in 0..world.rows() {
        for col in 0..world.cols() {
            let pos = Position::new(row as i32, col as i32);
            let symbol = if world.has_wall_at(pos) {
                '#'
            } else if let Some(agent) = world.agent_at(pos) {
                agent_symbol(agent.id)
            } else if world.is_visited(pos) {
                '+'
            } else {
                '.'
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}

/// Frame name without extension: `{rows}x{cols}_ep{episode}[_suffix]`
pub fn frame_stem(rows: usize, cols: usize, episode: usize, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) if !suffix.is_empty() => format!("{rows}x{cols}_ep{episode}_{suffix}"),
        _ => format!("{rows}x{cols}_ep{episode}"),
    }
}

/// Writes PNG frames of a world into an output directory
///
/// The directory is created on demand if it does not exist.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    dir: PathBuf,
    frames_written: usize,
}

impl FrameRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            frames_written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Write the current world as `{rows}x{cols}_ep{episode}[_suffix].png`
    pub fn write(&mut self, world: &World, episode: usize, suffix: Option<&str>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let name = format!(
            "{}.png",
            frame_stem(world.rows(), world.cols(), episode, suffix)
        );
        let path = self.dir.join(name);
        render_image(world).save_with_format(&path, ImageFormat::Png)?;
        self.frames_written += 1;
        debug!(path = ?path, "frame written");
        Ok(path)
    }
}
