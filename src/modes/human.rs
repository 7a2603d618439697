use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use super::terminal::{Tui, restore_terminal, setup_terminal};
use crate::game::{Action, EnvConfig, Topology};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::EpisodeMetrics;
use crate::render::{Renderer, StatusLine};
use crate::rl::{CoverageEnvironment, ObservationBackend, default_device};

/// Keyboard-driven play: agent 0 follows the keys, every other agent waits
///
/// The world advances one tick per movement key.
pub struct HumanMode {
    env: CoverageEnvironment<ObservationBackend>,
    metrics: EpisodeMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    episode_reward: f64,
}

impl HumanMode {
    pub fn new(topology: Topology, config: EnvConfig) -> Result<Self> {
        let mut env = CoverageEnvironment::new(topology, config, default_device())
            .context("Failed to create environment")?;
        env.reset();

        Ok(Self {
            env,
            metrics: EpisodeMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            episode_reward: 0.0,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.run_game_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn run_game_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
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

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Move(action) => self.play(action)?,
                KeyAction::Restart => self.reset_game(),
                KeyAction::Quit => self.should_quit = true,
                KeyAction::TogglePause | KeyAction::Speed(_) | KeyAction::None => {}
            }
        }

        Ok(())
    }

    /// Advance one tick with `action` for agent 0
    fn play(&mut self, action: Action) -> Result<()> {
        if self.env.is_done() {
            return Ok(());
        }

        let mut actions = vec![Action::Wait; self.env.num_agents()];
        actions[0] = action;

        let (_, reward, done, step_info) = self.env.step_actions(&actions)?;
        self.episode_reward += reward.total();

        if done {
            self.metrics
                .on_episode_end(step_info.total_coverage, self.episode_reward);
            info!(
                reward = self.episode_reward,
                coverage = step_info.total_coverage,
                "episode finished"
            );
        }
        Ok(())
    }

    fn reset_game(&mut self) {
        self.env.reset();
        self.metrics.on_episode_start();
        self.episode_reward = 0.0;
    }

    fn status(&self) -> StatusLine {
        StatusLine {
            mode: "human",
            episode: self.env.engine().episode(),
            paused: false,
            speed: None,
            done: self.env.is_done(),
            last_reward: self.episode_reward,
        }
    }
}
