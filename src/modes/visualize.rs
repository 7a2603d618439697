//! Visualization mode for watching agents explore
//!
//! Every agent picks a random action each tick. Finished episodes restart
//! automatically.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{Interval, interval};
use tracing::info;

use super::terminal::{Tui, restore_terminal, setup_terminal};
use crate::game::{EnvConfig, Topology};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::EpisodeMetrics;
use crate::render::{Renderer, StatusLine};
use crate::rl::{CoverageEnvironment, ObservationBackend, default_device};

/// Visualization speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 2 Hz (500ms per step)
    Slow,
    /// Normal: 8 Hz (125ms per step)
    Normal,
    /// Fast: 20 Hz (50ms per step)
    Fast,
    /// Very Fast: 60 Hz (16ms per step)
    VeryFast,
}

impl VisualizationSpeed {
    /// Speed for keys 1-4
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Slow),
            2 => Some(Self::Normal),
            3 => Some(Self::Fast),
            4 => Some(Self::VeryFast),
            _ => None,
        }
    }

    /// Get the tick interval for this speed
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

pub struct VisualizeMode {
    env: CoverageEnvironment<ObservationBackend>,
    rng: StdRng,
    renderer: Renderer,
    input_handler: InputHandler,
    metrics: EpisodeMetrics,
    should_quit: bool,
    paused: bool,
    speed: VisualizationSpeed,
    episode_reward: f64,
}

impl VisualizeMode {
    pub fn new(
        topology: Topology,
        config: EnvConfig,
        seed: Option<u64>,
        frames: Option<PathBuf>,
    ) -> Result<Self> {
        let mut env = CoverageEnvironment::new(topology, config, default_device())
            .context("Failed to create environment")?;
        if let Some(dir) = frames {
            env.record_frames(dir);
        }
        env.reset();

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            env,
            rng,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            metrics: EpisodeMetrics::new(),
            should_quit: false,
            paused: false,
            speed: VisualizationSpeed::Normal,
            episode_reward: 0.0,
        })
    }

    /// Run the visualization loop
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.run_visualization_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        self.env.close();
        result
    }

    async fn run_visualization_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks based on speed
        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.advance()?;
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.env.world(), &self.metrics, &self.status());
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// One tick: step random actions, or restart a finished episode
    fn advance(&mut self) -> Result<()> {
        if self.env.is_done() {
            self.restart();
            return Ok(());
        }

        let actions = self.env.action_space().sample(&mut self.rng);
        let (_, reward, done, step_info) = self.env.step_actions(&actions)?;
        self.episode_reward += reward.total();

        if done {
            self.metrics
                .on_episode_end(step_info.total_coverage, self.episode_reward);
            self.env
                .render_frame(Some("final"))
                .context("Failed to write frame")?;
            info!(
                episode = self.env.engine().episode(),
                reward = self.episode_reward,
                coverage = step_info.total_coverage,
                "episode finished"
            );
        }
        Ok(())
    }

    fn restart(&mut self) {
        self.env.reset();
        self.metrics.on_episode_start();
        self.episode_reward = 0.0;
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => self.should_quit = true,
                KeyAction::TogglePause => self.paused = !self.paused,
                KeyAction::Restart => self.restart(),
                KeyAction::Speed(level) => {
                    if let Some(speed) = VisualizationSpeed::from_level(level) {
                        self.change_speed(speed, tick_timer);
                    }
                }
                KeyAction::Move(_) | KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        *tick_timer = interval(self.speed.tick_interval());
    }

    fn status(&self) -> StatusLine {
        StatusLine {
            mode: "visualize",
            episode: self.env.engine().episode(),
            paused: self.paused,
            speed: Some(self.speed.as_str()),
            done: self.env.is_done(),
            last_reward: self.episode_reward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode() -> VisualizeMode {
        let topology = Topology::open_room(3, 4, 2).unwrap();
        let config = EnvConfig::new(4, 1, Some(1.0));
        VisualizeMode::new(topology, config, Some(11), None).unwrap()
    }

    #[test]
    fn test_visualization_speed() {
        assert_eq!(VisualizationSpeed::Slow.tick_interval(), Duration::from_millis(500));
        assert_eq!(VisualizationSpeed::Normal.tick_interval(), Duration::from_millis(125));
        assert_eq!(VisualizationSpeed::Fast.tick_interval(), Duration::from_millis(50));
        assert_eq!(VisualizationSpeed::VeryFast.tick_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_speed_levels() {
        assert_eq!(VisualizationSpeed::from_level(1), Some(VisualizationSpeed::Slow));
        assert_eq!(VisualizationSpeed::from_level(4), Some(VisualizationSpeed::VeryFast));
        assert_eq!(VisualizationSpeed::from_level(0), None);
    }

    #[test]
    fn test_visualize_mode_creation() {
        let mode = mode();
        assert!(!mode.paused);
        assert_eq!(mode.speed, VisualizationSpeed::Normal);
        assert_eq!(mode.env.engine().episode(), 0);
    }

    #[test]
    fn test_auto_restart_after_episode() {
        let mut mode = mode();

        let mut ticks = 0;
        while !mode.env.is_done() && ticks < 1_000 {
            mode.advance().unwrap();
            ticks += 1;
        }
        assert!(mode.env.is_done());
        assert_eq!(mode.metrics.episodes_played, 1);

        mode.advance().unwrap();
        assert!(!mode.env.is_done());
        assert_eq!(mode.env.engine().episode(), 1);
        assert_eq!(mode.episode_reward, 0.0);
    }
}
