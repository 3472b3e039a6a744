use thiserror::Error;

use crate::components::Pos;

#[derive(Error, Debug)]
pub enum MazeError {
    #[error("grid dimensions must be positive, got {cols}x{rows}")]
    InvalidDimensions { cols: usize, rows: usize },

    #[error("cells {a:?} and {b:?} are not adjacent")]
    NotAdjacent { a: Pos, b: Pos },

    #[error("grid growth must add at least one cell per level")]
    InvalidGrowth,

    #[error("grid size overflows at level {level}")]
    SizeOverflow { level: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MazeError>;
