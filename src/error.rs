use thiserror::Error;

/// Errors raised while building or driving a coverage environment.
///
/// Illegal moves and collisions are ordinary reward outcomes and never show up here.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("topology has no cells")]
    EmptyTopology,

    #[error("topology row {row} has {actual} cells, expected {expected}")]
    RaggedTopology {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("unknown cell code {code} at ({row}, {col})")]
    UnknownCellCode { row: usize, col: usize, code: u8 },

    #[error("unknown map symbol {symbol:?} at line {line}, column {col}")]
    UnknownMapSymbol { line: usize, col: usize, symbol: char },

    #[error("topology has no agent start cells")]
    NoAgents,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("expected {expected} actions, got {actual}")]
    ActionCountMismatch { expected: usize, actual: usize },

    #[error("action index {0} is out of range")]
    InvalidAction(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode frame: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GridError>;
