use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use grid_coverage::game::{EnvConfig, Topology};
use grid_coverage::modes::{HumanMode, RunMode, RunOptions, VisualizeMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_coverage")]
#[command(version, about = "Multi-agent grid coverage environment")]
struct Cli {
    /// Execution mode
    #[arg(long, value_enum, default_value = "run")]
    mode: Mode,

    /// ASCII map file (`.` empty, `A` agent start, `#` wall)
    #[arg(long, conflicts_with_all = ["rows", "cols", "agents"])]
    map: Option<PathBuf>,

    /// Rows of the generated open room
    #[arg(long, default_value = "16")]
    rows: usize,

    /// Columns of the generated open room
    #[arg(long, default_value = "20")]
    cols: usize,

    /// Agents in the generated open room
    #[arg(long, default_value = "3")]
    agents: usize,

    /// Episodes to play in run mode
    #[arg(long, default_value = "5")]
    episodes: usize,

    /// Print every n-th episode in run mode
    #[arg(long, default_value = "1")]
    split: usize,

    /// Radius of each agent's local view
    #[arg(long, default_value = "1")]
    view_radius: usize,

    /// Observation channels (at least 4)
    #[arg(long, default_value = "4")]
    channels: usize,

    /// Traversal limit factor; 0 disables the limit
    #[arg(long, default_value = "1.0")]
    traversal_limit: f64,

    /// Collisions are penalised but do not end the episode
    #[arg(long)]
    test_mode: bool,

    /// Write PNG frames into this directory
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Seed for the random action policy
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Headless random agents with episode summaries
    Run,
    /// Watch random agents in the terminal
    Visualize,
    /// Drive agent 0 with the keyboard
    Human,
}

impl Cli {
    fn topology(&self) -> Result<Topology> {
        match &self.map {
            Some(path) => Topology::load(path)
                .with_context(|| format!("Failed to load map from {:?}", path)),
            None => Topology::open_room(self.rows, self.cols, self.agents)
                .context("Failed to build open room"),
        }
    }

    fn env_config(&self) -> Result<EnvConfig> {
        if self.traversal_limit < 0.0 {
            bail!("--traversal-limit must not be negative");
        }
        let mut config = EnvConfig::new(
            self.channels,
            self.view_radius,
            Some(self.traversal_limit),
        );
        config.test_mode = self.test_mode;
        config.validate().context("Invalid environment configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // TUI modes draw on stderr, so only log there in headless runs
    if matches!(cli.mode, Mode::Run) {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let topology = cli.topology()?;
    let config = cli.env_config()?;

    match cli.mode {
        Mode::Run => {
            let options = RunOptions {
                episodes: cli.episodes,
                split: cli.split,
                frames: cli.frames.clone(),
                seed: cli.seed,
                ..RunOptions::default()
            };
            let mut run_mode = RunMode::new(topology, config, options)?;
            run_mode.run()?;
        }
        Mode::Visualize => {
            let mut visualize_mode =
                VisualizeMode::new(topology, config, cli.seed, cli.frames.clone())?;
            visualize_mode.run().await?;
        }
        Mode::Human => {
            let mut human_mode = HumanMode::new(topology, config)?;
            human_mode.run().await?;
        }
    }

    Ok(())
}
