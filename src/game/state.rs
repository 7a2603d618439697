use std::collections::{HashMap, HashSet};

use super::action::Action;
use super::topology::Topology;

/// A cell on the grid, addressed by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Move position by delta
    pub fn moved_by(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Position an action would lead to
    pub fn moved_by_action(&self, action: Action) -> Self {
        let (d_row, d_col) = action.delta();
        self.moved_by(d_row, d_col)
    }

    /// The four orthogonal neighbours (up, down, left, right)
    pub fn neighbours(&self) -> [Position; 4] {
        [
            self.moved_by(-1, 0),
            self.moved_by(1, 0),
            self.moved_by(0, -1),
            self.moved_by(0, 1),
        ]
    }
}

pub type AgentId = usize;

/// A moving explorer
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub pos: Position,
    pub steps_taken: u32,
    pub cells_covered: u32,
    pub collided: bool,
}

impl Agent {
    pub fn new(id: AgentId, pos: Position) -> Self {
        Self {
            id,
            pos,
            steps_taken: 0,
            cells_covered: 0,
            collided: false,
        }
    }

    /// Position this agent would occupy after `action`
    pub fn proposed_position(&self, action: Action) -> Position {
        self.pos.moved_by_action(action)
    }

    pub fn name(&self) -> String {
        format!("Agent {}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wall {
    pub pos: Position,
}

/// A cell visited at least once, tagged with the agent that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeenCell {
    pub pos: Position,
    pub agent_id: AgentId,
}

/// One accepted displacement, kept for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailSegment {
    pub old_pos: Position,
    pub new_pos: Position,
    pub agent_id: AgentId,
    /// Distinguishes segments drawn over the same edge
    pub curve_no: u32,
}

/// Overall and per-agent coverage percentages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub overall: u32,
    pub per_agent: Vec<u32>,
}

/// Round `100 * part / total` to an integer percentage, ties to even
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round_ties_even() as u32
}

fn edge_key(a: Position, b: Position) -> (Position, Position) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Complete mutable world for one episode
///
/// `seen_cells` and `trails` are append-only and keep creation order.
#[derive(Debug, Clone)]
pub struct World {
    rows: usize,
    cols: usize,
    agents: Vec<Agent>,
    walls: Vec<Wall>,
    seen_cells: Vec<SeenCell>,
    trails: Vec<TrailSegment>,
    total_cells: usize,
    wall_index: HashSet<Position>,
    seen_index: HashSet<Position>,
    /// Highest curve number per unordered edge
    edge_curves: HashMap<(Position, Position), u32>,
}

impl World {
    /// Build a fresh world: agents at their starts, start cells pre-marked seen
    pub fn from_topology(topology: &Topology) -> Self {
        let walls: Vec<Wall> = topology
            .wall_positions()
            .into_iter()
            .map(|pos| Wall { pos })
            .collect();
        let wall_index = walls.iter().map(|w| w.pos).collect();

        let mut world = Self {
            rows: topology.rows(),
            cols: topology.cols(),
            agents: Vec::new(),
            walls,
            seen_cells: Vec::new(),
            trails: Vec::new(),
            total_cells: topology.explorable_cells(),
            wall_index,
            seen_index: HashSet::new(),
            edge_curves: HashMap::new(),
        };

        for (id, pos) in topology.agent_starts().into_iter().enumerate() {
            world.agents.push(Agent::new(id, pos));
            world.mark_visited(pos, id);
        }

        world
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id]
    }

    pub(crate) fn agent_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id]
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn seen_cells(&self) -> &[SeenCell] {
        &self.seen_cells
    }

    pub fn trails(&self) -> &[TrailSegment] {
        &self.trails
    }

    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.rows as i32 && pos.col >= 0 && pos.col < self.cols as i32
    }

    /// Record the first visit of `pos` by `agent_id`
    ///
    /// Callers must only invoke this on a cell's first visit.
    pub fn mark_visited(&mut self, pos: Position, agent_id: AgentId) {
        debug_assert!(!self.seen_index.contains(&pos), "cell {pos:?} already seen");
        self.seen_cells.push(SeenCell { pos, agent_id });
        self.seen_index.insert(pos);
        self.agents[agent_id].cells_covered += 1;
    }

    /// Append a trail segment for an accepted move; no-op when nothing moved
    pub fn add_trail(&mut self, old_pos: Position, new_pos: Position, agent_id: AgentId) {
        if old_pos == new_pos {
            return;
        }
        let curve_no = *self
            .edge_curves
            .entry(edge_key(old_pos, new_pos))
            .and_modify(|c| *c += 1)
            .or_insert(0);
        self.trails.push(TrailSegment {
            old_pos,
            new_pos,
            agent_id,
            curve_no,
        });
    }

    pub fn coverage(&self) -> Coverage {
        Coverage {
            overall: percentage(self.seen_cells.len(), self.total_cells),
            per_agent: self
                .agents
                .iter()
                .map(|a| percentage(a.cells_covered as usize, self.total_cells))
                .collect(),
        }
    }

    pub fn is_visited(&self, pos: Position) -> bool {
        self.seen_index.contains(&pos)
    }

    pub fn seen_cell(&self, pos: Position) -> Option<&SeenCell> {
        if !self.is_visited(pos) {
            return None;
        }
        self.seen_cells.iter().find(|c| c.pos == pos)
    }

    /// Agent standing on `pos`, if any
    pub fn agent_at(&self, pos: Position) -> Option<&Agent> {
        self.agents.iter().find(|a| a.pos == pos)
    }

    pub fn has_agent_at(&self, pos: Position) -> bool {
        self.agent_at(pos).is_some()
    }

    pub fn has_wall_at(&self, pos: Position) -> bool {
        self.wall_index.contains(&pos)
    }

    pub fn all_visited(&self) -> bool {
        self.seen_cells.len() == self.total_cells
    }

    /// Number of cells in the `(2r+1)²` window around `center` that were never visited
    ///
    /// Out-of-grid cells count as unvisited.
    pub fn count_unvisited_around(&self, center: Position, radius: usize) -> usize {
        let r = radius as i32;
        let mut count = 0;
        for i in -r..=r {
            for j in -r..=r {
                if !self.is_visited(center.moved_by(i, j)) {
                    count += 1;
                }
            }
        }
        count
    }
}
