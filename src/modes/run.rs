//! Headless runner driving every agent with random actions
//!
//! Prints a summary of every `split`-th episode and of the last one.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::game::{Action, EnvConfig, StepInfo, Topology};
use crate::metrics::EpisodeMetrics;
use crate::rl::{CoverageEnvironment, ObservationBackend, default_device};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub episodes: usize,
    /// Print every `split`-th episode
    pub split: usize,
    /// Directory for PNG frames; no frames when unset
    pub frames: Option<PathBuf>,
    pub seed: Option<u64>,
    /// Hard cap on steps per episode
    pub max_steps: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            episodes: 5,
            split: 1,
            frames: None,
            seed: None,
            max_steps: 10_000,
        }
    }
}

/// Outcome of one finished episode
#[derive(Debug, Clone)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub reward: f64,
    pub steps: usize,
    pub info: StepInfo,
}

/// Boolean spelled `True`/`False` in episode reports
fn title_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Reward rounded to two decimals, printed in shortest form with at least one decimal
fn round_reward(reward: f64) -> String {
    let rounded: f64 = format!("{reward:.2}").parse().unwrap_or(reward);
    let text = rounded.to_string();
    if text.contains('.') || !rounded.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Multi-line episode report, one line per info entry
pub fn format_episode(episode: usize, reward: f64, info: &StepInfo) -> String {
    let mut out = format!("Episode: {episode:>3}\n");
    out.push_str(&format!(" | total_coverage: {:>4}\n", info.total_coverage));
    out.push_str(&format!(" | collision: {:>4}\n", title_bool(info.collision)));
    out.push_str(&format!(
        " | traversal_limit_reached: {:>4}\n",
        title_bool(info.traversal_limit_reached)
    ));
    let reward = round_reward(reward);
    for agent in &info.agents {
        out.push_str(&format!(
            " | {}: Reward = {}| Coverage = {}%| Steps Taken = {}\n",
            agent.name, reward, agent.coverage, agent.steps_taken
        ));
    }
    out
}

pub struct RunMode {
    env: CoverageEnvironment<ObservationBackend>,
    rng: StdRng,
    options: RunOptions,
    metrics: EpisodeMetrics,
}

impl RunMode {
    pub fn new(topology: Topology, config: EnvConfig, options: RunOptions) -> Result<Self> {
        let mut env = CoverageEnvironment::new(topology, config, default_device())
            .context("Failed to create environment")?;
        if let Some(dir) = &options.frames {
            env.record_frames(dir);
        }

        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            env,
            rng,
            options,
            metrics: EpisodeMetrics::new(),
        })
    }

    /// Play all episodes and return their summaries
    pub fn run(&mut self) -> Result<Vec<EpisodeSummary>> {
        let split = self.options.split.max(1);
        let mut summaries = Vec::with_capacity(self.options.episodes);

        for n in 0..self.options.episodes {
            let summary = self.run_episode(n)?;

            if n % split == 0 || n + 1 == self.options.episodes {
                println!("{}", format_episode(n, summary.reward, &summary.info));
            }
            summaries.push(summary);
        }

        info!(
            episodes = self.metrics.episodes_played,
            best_coverage = self.metrics.best_coverage,
            "run finished"
        );
        self.env.close();
        Ok(summaries)
    }

    fn run_episode(&mut self, n: usize) -> Result<EpisodeSummary> {
        self.env.reset();
        self.metrics.on_episode_start();
        self.env
            .render_frame(Some("start"))
            .context("Failed to write frame")?;

        let action_space = self.env.action_space();
        let mut episode_reward = 0.0;
        let mut steps = 0;
        let mut info = self.env.engine().info();

        while !self.env.is_done() {
            if steps >= self.options.max_steps {
                warn!(episode = n, steps, "episode truncated");
                break;
            }

            let actions: Vec<Action> = action_space.sample(&mut self.rng);
            let (_, reward, _, step_info) = self.env.step_actions(&actions)?;
            episode_reward += reward.total();
            info = step_info;
            steps += 1;
        }

        self.env
            .render_frame(Some("final"))
            .context("Failed to write frame")?;
        self.metrics.update();
        self.metrics.on_episode_end(info.total_coverage, episode_reward);

        info!(
            episode = n,
            reward = episode_reward,
            coverage = info.total_coverage,
            steps,
            "episode finished"
        );

        Ok(EpisodeSummary {
            episode: n,
            reward: episode_reward,
            steps,
            info,
        })
    }

    pub fn metrics(&self) -> &EpisodeMetrics {
        &self.metrics
    }
}
