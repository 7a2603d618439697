use std::path::{Path, PathBuf};

use burn::tensor::{Tensor, backend::Backend};
use tracing::debug;

use super::observation::create_observation;
use crate::error::Result;
use crate::game::{Action, ActionSpace, EnvConfig, GridEngine, Reward, StepInfo, Topology, World};
use crate::render::{FrameRecorder, render_ascii};

/// Multi-agent coverage environment for reinforcement learning
///
/// Wraps the grid engine and provides a Burn-compatible RL interface with:
/// - Stacked local-view observations `[num_agents, 2r+1, 2r+1, channels]`
/// - One discrete choice out of 5 per agent (Up, Down, Left, Right, Wait)
/// - Standard RL interface (reset, step, close)
pub struct CoverageEnvironment<B: Backend> {
    engine: GridEngine,
    device: B::Device,
    recorder: Option<FrameRecorder>,
}

impl<B: Backend> CoverageEnvironment<B> {
    /// Create a new environment; fails on an invalid configuration
    pub fn new(topology: Topology, config: EnvConfig, device: B::Device) -> Result<Self> {
        let engine = GridEngine::new(topology, config)?;
        Ok(Self {
            engine,
            device,
            recorder: None,
        })
    }

    /// Reset the environment and return the initial observation of every agent
    ///
    /// Returns: Tensor<B, 4> with shape [num_agents, 2r+1, 2r+1, channels]
    pub fn reset(&mut self) -> Tensor<B, 4> {
        self.engine.reset();
        self.get_observation()
    }

    /// Step the environment with one discrete action index per agent
    ///
    /// Actions:
    /// - 0: Up
    /// - 1: Down
    /// - 2: Left
    /// - 3: Right
    /// - 4: Wait
    ///
    /// Returns: (observation, reward, done, info)
    pub fn step(&mut self, actions: &[usize]) -> Result<(Tensor<B, 4>, Reward, bool, StepInfo)> {
        let result = self.engine.step_indices(actions)?;
        let observation = self.get_observation();
        Ok((observation, result.reward, result.done, result.info))
    }

    /// Step the environment with typed actions, one per agent
    pub fn step_actions(
        &mut self,
        actions: &[Action],
    ) -> Result<(Tensor<B, 4>, Reward, bool, StepInfo)> {
        let result = self.engine.step(actions)?;
        let observation = self.get_observation();
        Ok((observation, result.reward, result.done, result.info))
    }

    /// Get current observation without stepping
    pub fn get_observation(&self) -> Tensor<B, 4> {
        let config = self.engine.config();
        create_observation(
            self.engine.world(),
            config.view_radius,
            config.n_channels,
            &self.device,
        )
    }

    /// Shape of the stacked observation tensor
    pub fn observation_shape(&self) -> [usize; 4] {
        let config = self.engine.config();
        let size = config.view_size();
        [self.num_agents(), size, size, config.n_channels]
    }

    pub fn action_space(&self) -> ActionSpace {
        self.engine.action_space()
    }

    pub fn num_agents(&self) -> usize {
        self.engine.num_agents()
    }

    /// Start writing PNG frames into `dir`
    pub fn record_frames(&mut self, dir: impl AsRef<Path>) {
        self.recorder = Some(FrameRecorder::new(dir.as_ref()));
    }

    /// Write a frame of the current world, if a recorder is attached
    pub fn render_frame(&mut self, suffix: Option<&str>) -> Result<Option<PathBuf>> {
        let episode = self.engine.episode();
        match self.recorder.as_mut() {
            Some(recorder) => Ok(Some(recorder.write(self.engine.world(), episode, suffix)?)),
            None => Ok(None),
        }
    }

    /// Text rendering of the current world
    pub fn render(&self) -> String {
        render_ascii(self.engine.world())
    }

    /// Release the attached frame recorder
    pub fn close(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            debug!(
                frames = recorder.frames_written(),
                dir = ?recorder.dir(),
                "frame recorder closed"
            );
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.engine.is_done()
    }

    /// Get the device used by this environment
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Read-only access to the world (for renderers and tests)
    pub fn world(&self) -> &World {
        self.engine.world()
    }

    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }
}
