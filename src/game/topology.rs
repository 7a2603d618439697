use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::Position;
use crate::error::{GridError, Result};

/// Code of a single topology cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellCode {
    Empty,
    AgentStart,
    Wall,
}

impl CellCode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellCode::Empty),
            1 => Some(CellCode::AgentStart),
            2 => Some(CellCode::Wall),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            CellCode::Empty => 0,
            CellCode::AgentStart => 1,
            CellCode::Wall => 2,
        }
    }

    fn symbol(&self) -> char {
        match self {
            CellCode::Empty => '.',
            CellCode::AgentStart => 'A',
            CellCode::Wall => '#',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(CellCode::Empty),
            'A' | 'a' => Some(CellCode::AgentStart),
            '#' => Some(CellCode::Wall),
            _ => None,
        }
    }
}

/// Static, validated description of an episode's grid
///
/// Rebuilding a world from the same topology always yields the same agents,
/// walls and agent ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    rows: usize,
    cols: usize,
    cells: Vec<CellCode>,
}

impl Topology {
    /// Build a topology from raw cell codes (`0` empty, `1` agent start, `2` wall)
    pub fn from_codes(grid: &[Vec<u8>]) -> Result<Self> {
        let rows = grid.len();
        let cols = grid.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyTopology);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in grid.iter().enumerate() {
            if line.len() != cols {
                return Err(GridError::RaggedTopology {
                    row,
                    expected: cols,
                    actual: line.len(),
                });
            }
            for (col, &code) in line.iter().enumerate() {
                let cell =
                    CellCode::from_code(code).ok_or(GridError::UnknownCellCode { row, col, code })?;
                cells.push(cell);
            }
        }

        Self::from_cells(rows, cols, cells)
    }

    /// Open room with `num_agents` agents placed along the first row
    pub fn open_room(rows: usize, cols: usize, num_agents: usize) -> Result<Self> {
        if num_agents > cols {
            return Err(GridError::InvalidConfig(format!(
                "cannot place {num_agents} agents on a row of {cols} cells"
            )));
        }
        let mut cells = vec![CellCode::Empty; rows * cols];
        for col in 0..num_agents.min(cells.len()) {
            cells[col] = CellCode::AgentStart;
        }
        Self::from_cells(rows, cols, cells)
    }

    /// Load an ASCII map from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    fn from_cells(rows: usize, cols: usize, cells: Vec<CellCode>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyTopology);
        }
        if !cells.contains(&CellCode::AgentStart) {
            return Err(GridError::NoAgents);
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, row: usize, col: usize) -> CellCode {
        self.cells[row * self.cols + col]
    }

    /// Number of cells that are not walls
    pub fn explorable_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c != CellCode::Wall).count()
    }

    /// Agent start cells in id order
    ///
    /// Ids are assigned scanning column by column, top to bottom within a column.
    pub fn agent_starts(&self) -> Vec<Position> {
        self.positions_of(CellCode::AgentStart)
    }

    pub fn wall_positions(&self) -> Vec<Position> {
        self.positions_of(CellCode::Wall)
    }

    pub fn num_agents(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&c| c == CellCode::AgentStart)
            .count()
    }

    fn positions_of(&self, wanted: CellCode) -> Vec<Position> {
        let mut positions = Vec::new();
        for col in 0..self.cols {
            for row in 0..self.rows {
                if self.cell(row, col) == wanted {
                    positions.push(Position::new(row as i32, col as i32));
                }
            }
        }
        positions
    }
}

impl FromStr for Topology {
    type Err = GridError;

    /// Parse an ASCII map: `.` empty, `A` agent start, `#` wall
    fn from_str(s: &str) -> Result<Self> {
        let mut grid = Vec::new();
        for (line_no, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::with_capacity(line.len());
            for (col, symbol) in line.chars().enumerate() {
                let cell = CellCode::from_symbol(symbol).ok_or(GridError::UnknownMapSymbol {
                    line: line_no + 1,
                    col,
                    symbol,
                })?;
                row.push(cell.code());
            }
            grid.push(row);
        }
        Self::from_codes(&grid)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = (0..self.cols).map(|col| self.cell(row, col).symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
