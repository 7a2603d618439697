use serde::Serialize;
use tracing::{debug, warn};

use super::{
    action::{Action, ActionSpace},
    config::EnvConfig,
    reward::{EpisodeCounters, MoveKind, RewardEngine},
    state::World,
    topology::Topology,
};
use crate::error::{GridError, Result};

/// Lifecycle of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Freshly reset, no step taken yet
    Ready,
    /// At least one step taken, episode still running
    InStep,
    /// Terminal for this episode; call `reset` to continue
    Done,
}

/// Per-agent entry of the step info
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentInfo {
    pub name: String,
    pub coverage: u32,
    pub steps_taken: u32,
}

/// Aggregate metrics reported after every step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepInfo {
    pub total_coverage: u32,
    /// Whether any agent has collided this episode
    pub collision: bool,
    pub traversal_limit_reached: bool,
    pub agents: Vec<AgentInfo>,
}

/// Reward handed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    /// Centralised: sum of all agents' rewards
    Total(f64),
    /// Shared: every agent receives the team total
    Shared(Vec<f64>),
}

impl Reward {
    /// Team total regardless of mode
    pub fn total(&self) -> f64 {
        match self {
            Reward::Total(r) => *r,
            Reward::Shared(rs) => rs.first().copied().unwrap_or(0.0),
        }
    }
}

/// Result of a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub reward: Reward,
    /// Raw reward earned by each agent, in id order
    pub agent_rewards: Vec<f64>,
    /// How each agent's move was resolved, in id order
    pub moves: Vec<MoveKind>,
    pub done: bool,
    pub info: StepInfo,
}

/// Drives episodes: owns the world and resolves all agents' moves each tick
#[derive(Debug, Clone)]
pub struct GridEngine {
    topology: Topology,
    config: EnvConfig,
    world: World,
    counters: EpisodeCounters,
    phase: EpisodePhase,
    episode: usize,
}

impl GridEngine {
    /// Create an engine; fails on an invalid configuration
    pub fn new(topology: Topology, config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let world = World::from_topology(&topology);
        Ok(Self {
            topology,
            config,
            world,
            counters: EpisodeCounters::new(),
            phase: EpisodePhase::Ready,
            episode: 0,
        })
    }

    /// Discard the world and rebuild it from the topology
    ///
    /// The episode index advances only when the discarded episode was stepped.
    pub fn reset(&mut self) {
        if self.phase != EpisodePhase::Ready {
            self.episode += 1;
        }
        self.world = World::from_topology(&self.topology);
        self.counters = EpisodeCounters::new();
        self.phase = EpisodePhase::Ready;
        debug!(episode = self.episode, "episode reset");
    }

    /// Execute one tick from discrete action indices (0 up, 1 down, 2 left, 3 right, 4 wait)
    pub fn step_indices(&mut self, indices: &[usize]) -> Result<StepResult> {
        let actions = indices
            .iter()
            .map(|&idx| Action::from_index(idx))
            .collect::<Result<Vec<_>>>()?;
        self.step(&actions)
    }

    /// Execute one tick: agents are resolved sequentially in ascending id order
    pub fn step(&mut self, actions: &[Action]) -> Result<StepResult> {
        let num_agents = self.num_agents();
        if actions.len() != num_agents {
            return Err(GridError::ActionCountMismatch {
                expected: num_agents,
                actual: actions.len(),
            });
        }

        if self.phase == EpisodePhase::Done {
            warn!(episode = self.episode, "step called on a finished episode");
            return Ok(StepResult {
                reward: self.combine_rewards(&vec![0.0; num_agents]),
                agent_rewards: vec![0.0; num_agents],
                moves: Vec::new(),
                done: true,
                info: self.info(),
            });
        }

        self.phase = EpisodePhase::InStep;

        let engine = RewardEngine::new(
            &self.config.rewards,
            self.config.test_mode,
            self.config.view_radius,
        );
        let mut done = false;
        let mut agent_rewards = Vec::with_capacity(num_agents);
        let mut moves = Vec::with_capacity(num_agents);

        for (id, &action) in actions.iter().enumerate() {
            let current = self.world.agent(id).pos;
            let proposed = self.world.agent(id).proposed_position(action);

            let outcome = engine.resolve(&mut self.world, &mut self.counters, id, proposed, done);
            done = outcome.done;

            self.world.add_trail(current, outcome.resolved, id);
            let agent = self.world.agent_mut(id);
            agent.pos = outcome.resolved;
            agent.steps_taken += 1;

            agent_rewards.push(outcome.reward);
            moves.push(outcome.kind);
        }

        let limit_reached = self.traversal_limit_reached();
        if limit_reached {
            debug!(
                episode = self.episode,
                stagnation = self.counters.stagnation,
                "traversal limit reached"
            );
            done = true;
        }

        if done || self.world.all_visited() {
            done = true;
            self.phase = EpisodePhase::Done;
        }

        Ok(StepResult {
            reward: self.combine_rewards(&agent_rewards),
            agent_rewards,
            moves,
            done,
            info: self.info(),
        })
    }

    fn combine_rewards(&self, agent_rewards: &[f64]) -> Reward {
        let total: f64 = agent_rewards.iter().sum();
        if self.config.shared_reward {
            Reward::Shared(vec![total; agent_rewards.len()])
        } else {
            Reward::Total(total)
        }
    }

    /// Number of stagnant resolutions that ends the episode, if the limit is enabled
    pub fn traversal_limit(&self) -> Option<usize> {
        self.config.traversal_limit().map(|factor| {
            (factor * self.world.total_cells() as f64).round_ties_even() as usize
        })
    }

    fn traversal_limit_reached(&self) -> bool {
        self.traversal_limit()
            .is_some_and(|limit| self.counters.stagnation >= limit)
    }

    /// Current coverage, collision and per-agent stats
    pub fn info(&self) -> StepInfo {
        let coverage = self.world.coverage();
        StepInfo {
            total_coverage: coverage.overall,
            collision: self.world.agents().iter().any(|a| a.collided),
            traversal_limit_reached: self.traversal_limit_reached(),
            agents: self
                .world
                .agents()
                .iter()
                .zip(coverage.per_agent)
                .map(|(agent, coverage)| AgentInfo {
                    name: agent.name(),
                    coverage,
                    steps_taken: agent.steps_taken,
                })
                .collect(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == EpisodePhase::Done
    }

    pub fn counters(&self) -> &EpisodeCounters {
        &self.counters
    }

    /// Index of the current episode
    pub fn episode(&self) -> usize {
        self.episode
    }

    pub fn num_agents(&self) -> usize {
        self.world.agents().len()
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::new(self.num_agents())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Position;

    const EPS: f64 = 1e-9;

    fn engine(map: &str, config: EnvConfig) -> GridEngine {
        GridEngine::new(map.parse().unwrap(), config).unwrap()
    }

    #[test]
    fn test_reset_state() {
        let mut engine = engine("A..\n...\n..A\n", EnvConfig::default());

        assert_eq!(engine.phase(), EpisodePhase::Ready);
        assert_eq!(engine.world().seen_cells().len(), 2);
        assert_eq!(engine.info().total_coverage, 22);

        engine.step(&[Action::Right, Action::Left]).unwrap();
        engine.reset();

        assert_eq!(engine.phase(), EpisodePhase::Ready);
        assert_eq!(engine.world().seen_cells().len(), 2);
        assert!(engine.world().trails().is_empty());
        assert_eq!(engine.counters().stagnation, 0);
        assert!(!engine.counters().goal_granted);
        for agent in engine.world().agents() {
            assert_eq!(agent.steps_taken, 0);
        }
    }

    #[test]
    fn test_action_count_mismatch() {
        let mut engine = engine("A.A\n", EnvConfig::default());
        let err = engine.step(&[Action::Wait]).unwrap_err();
        assert!(matches!(
            err,
            GridError::ActionCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(engine.phase(), EpisodePhase::Ready);
    }

    #[test]
    fn test_invalid_action_index() {
        let mut engine = engine("A..\n", EnvConfig::default());
        assert!(matches!(
            engine.step_indices(&[9]),
            Err(GridError::InvalidAction(9))
        ));
    }

    #[test]
    fn test_single_agent_walkthrough() {
        let mut engine = engine("...\n.A.\n...\n", EnvConfig::default());

        let up = engine.step(&[Action::Up]).unwrap();
        assert!((up.reward.total() - 1.95).abs() < EPS);
        assert_eq!(up.info.total_coverage, 22);
        assert!(!up.done);
        assert_eq!(engine.phase(), EpisodePhase::InStep);

        let wait = engine.step(&[Action::Wait]).unwrap();
        assert!((wait.reward.total() - -0.1).abs() < EPS);
        assert_eq!(wait.info.total_coverage, 22);

        let down = engine.step(&[Action::Down]).unwrap();
        assert!((down.reward.total() - -0.05).abs() < EPS);
        assert_eq!(engine.world().agent(0).pos, Position::new(1, 1));
        assert_eq!(engine.world().agent(0).steps_taken, 3);
        assert_eq!(down.info.agents[0].steps_taken, 3);
        assert_eq!(down.info.agents[0].name, "Agent 0");
    }

    #[test]
    fn test_earlier_agent_blocks_later_agent() {
        // Agent 0 at (1,0), agent 1 at (0,1); both head for (0,0)
        let mut engine = engine(".A\nA.\n", EnvConfig::default());

        let result = engine.step(&[Action::Up, Action::Left]).unwrap();

        assert_eq!(result.moves, vec![MoveKind::NewCell, MoveKind::Collision]);
        assert_eq!(engine.world().agent(0).pos, Position::new(0, 0));
        assert_eq!(engine.world().agent(1).pos, Position::new(0, 1));
        assert!(engine.world().agent(0).collided);
        assert!(engine.world().agent(1).collided);
        assert!(result.done);
        assert!(result.info.collision);
    }

    #[test]
    fn test_head_on_collision_reverts_both() {
        // Agents two cells apart both try to swap into each other's cell
        let mut engine = engine("A.\n..\nA.\n", EnvConfig::default());
        engine.step(&[Action::Down, Action::Wait]).unwrap();

        // Agent 0 now at (1,0) next to agent 1 at (2,0)
        let result = engine.step(&[Action::Down, Action::Up]).unwrap();

        assert_eq!(result.moves, vec![MoveKind::Collision, MoveKind::Collision]);
        assert!((result.agent_rewards[0] - -20.0).abs() < EPS);
        assert!((result.agent_rewards[1] - -20.0).abs() < EPS);
        assert_eq!(engine.world().agent(0).pos, Position::new(1, 0));
        assert_eq!(engine.world().agent(1).pos, Position::new(2, 0));
        assert!(result.info.collision);
        assert!(result.done);
    }

    #[test]
    fn test_shared_reward_mode() {
        let config = EnvConfig {
            shared_reward: true,
            ..Default::default()
        };
        let mut engine = engine("A..\n...\n..A\n", config);

        let result = engine.step(&[Action::Wait, Action::Wait]).unwrap();

        match result.reward {
            Reward::Shared(rewards) => {
                assert_eq!(rewards.len(), 2);
                for r in rewards {
                    assert!((r - -0.2).abs() < EPS);
                }
            }
            Reward::Total(_) => panic!("expected shared reward"),
        }
    }

    #[test]
    fn test_goal_reached_finishes_episode() {
        let mut engine = engine("A.\n", EnvConfig::default());

        let result = engine.step(&[Action::Right]).unwrap();

        assert!(result.done);
        assert_eq!(result.info.total_coverage, 100);
        assert!(result.reward.total() > 100.0);
        assert_eq!(engine.phase(), EpisodePhase::Done);

        let after = engine.step(&[Action::Left]).unwrap();
        assert!(after.done);
        assert_eq!(after.reward.total(), 0.0);
        assert_eq!(engine.world().agent(0).pos, Position::new(0, 1));
        assert_eq!(engine.world().agent(0).steps_taken, 1);
    }

    #[test]
    fn test_traversal_limit() {
        let config = EnvConfig::new(4, 1, Some(1.0));
        let mut engine = engine("...\n.A.\n...\n", config);
        assert_eq!(engine.traversal_limit(), Some(9));

        for _ in 0..8 {
            let result = engine.step(&[Action::Wait]).unwrap();
            assert!(!result.done);
            assert!(!result.info.traversal_limit_reached);
        }

        let result = engine.step(&[Action::Wait]).unwrap();
        assert!(result.done);
        assert!(result.info.traversal_limit_reached);
    }

    #[test]
    fn test_traversal_limit_rounds_exact_factor() {
        // 0.7 × 5 = 3.5 rounds up to the even 4; 0.1 × 25 = 2.5 rounds down to 2
        let engine_a = engine("A....\n", EnvConfig::new(4, 1, Some(0.7)));
        assert_eq!(engine_a.traversal_limit(), Some(4));

        let topology = Topology::open_room(5, 5, 1).unwrap();
        let engine_b = GridEngine::new(topology, EnvConfig::new(4, 1, Some(0.1))).unwrap();
        assert_eq!(engine_b.traversal_limit(), Some(2));
    }

    #[test]
    fn test_trails_number_repeated_edges() {
        // Agent 0 at (0,0), agent 1 at (1,0)
        let mut engine = engine("A..\nA..\n", EnvConfig::default());

        engine.step(&[Action::Right, Action::Wait]).unwrap();
        engine.step(&[Action::Right, Action::Up]).unwrap();
        engine.step(&[Action::Wait, Action::Right]).unwrap();
        engine.step(&[Action::Wait, Action::Left]).unwrap();

        let top_left_edge: Vec<(usize, u32)> = engine
            .world()
            .trails()
            .iter()
            .filter(|t| {
                let cells = [t.old_pos, t.new_pos];
                cells.contains(&Position::new(0, 0)) && cells.contains(&Position::new(0, 1))
            })
            .map(|t| (t.agent_id, t.curve_no))
            .collect();
        assert_eq!(top_left_edge, vec![(0, 0), (1, 1), (1, 2)]);

        // Waits leave no segment; every other move got a fresh edge
        assert_eq!(engine.world().trails().len(), 5);
        let others: Vec<u32> = engine
            .world()
            .trails()
            .iter()
            .filter(|t| t.new_pos != Position::new(0, 1) && t.old_pos != Position::new(0, 1))
            .map(|t| t.curve_no)
            .collect();
        assert_eq!(others, vec![0]);
    }

    #[test]
    fn test_discovery_resets_stagnation() {
        let config = EnvConfig::new(4, 1, Some(1.0));
        let mut engine = engine("...\n.A.\n...\n", config);

        for _ in 0..5 {
            engine.step(&[Action::Wait]).unwrap();
        }
        assert_eq!(engine.counters().stagnation, 5);

        engine.step(&[Action::Up]).unwrap();
        assert_eq!(engine.counters().stagnation, 0);
    }

    #[test]
    fn test_traversal_limit_disabled() {
        let mut engine = engine("...\n.A.\n...\n", EnvConfig::new(4, 1, Some(0.0)));
        assert_eq!(engine.traversal_limit(), None);
        for _ in 0..30 {
            let result = engine.step(&[Action::Wait]).unwrap();
            assert!(!result.done);
            assert!(!result.info.traversal_limit_reached);
        }
    }

    #[test]
    fn test_collision_in_test_mode_continues() {
        let config = EnvConfig {
            test_mode: true,
            ..Default::default()
        };
        let mut engine = engine("A#\n..\n", config);

        let result = engine.step(&[Action::Right]).unwrap();

        assert!(!result.done);
        assert!(result.info.collision);
        assert_eq!(engine.phase(), EpisodePhase::InStep);
    }

    #[test]
    fn test_episode_index() {
        let mut engine = engine("A.\n..\n", EnvConfig::default());
        assert_eq!(engine.episode(), 0);

        engine.reset();
        assert_eq!(engine.episode(), 0);

        engine.step(&[Action::Wait]).unwrap();
        engine.reset();
        assert_eq!(engine.episode(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let topology: Topology = "A.\n".parse().unwrap();
        assert!(GridEngine::new(topology, EnvConfig::new(2, 1, None)).is_err());
    }
}
