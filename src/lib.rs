//! Perfect-maze generation, trail tracking and level progression for a
//! terminal maze game.

pub mod components;
pub mod config;
pub mod error;
pub mod grid;
pub mod level;
pub mod maze;
pub mod player;
pub mod render;

pub use components::{Dir, Pos};
pub use config::{Args, GameConfig, Sizing};
pub use error::{MazeError, Result};
pub use grid::{Cell, Grid};
pub use level::{setup, LevelController, LevelEvent, Phase};
pub use maze::{carve_spanning_tree, generate_maze};
pub use player::{MoveOutcome, MoveReport, Session, Trail};
