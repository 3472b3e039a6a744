use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::{MazeError, Result};

const DEFAULT_BASE_SIZE: usize = 6;
const DEFAULT_GROWTH: usize = 2;
const DEFAULT_PAUSE_MS: u64 = 1500;
const DEFAULT_RENDER_FPS: u64 = 60;

/// Terminal maze: walk from the top-left corner to the green exit.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Side offset of the grid; level N is `base + growth * N` cells wide
    #[arg(long, env = "MAZE_BASE_SIZE", default_value_t = DEFAULT_BASE_SIZE)]
    pub base_size: usize,

    /// Cells added to each side per level
    #[arg(long, env = "MAZE_GROWTH", default_value_t = DEFAULT_GROWTH)]
    pub growth: usize,

    /// Level to start at
    #[arg(long, env = "MAZE_LEVEL", default_value_t = 1)]
    pub level: u32,

    /// Random seed for reproducible mazes
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// Pause between finishing a level and the next maze, in milliseconds
    #[arg(long, env = "MAZE_PAUSE_MS", default_value_t = DEFAULT_PAUSE_MS)]
    pub pause_ms: u64,

    /// Render frame rate
    #[arg(long, env = "MAZE_FPS", default_value_t = DEFAULT_RENDER_FPS)]
    pub fps: u64,

    /// Write logs to this file (the terminal is taken over by the game)
    #[arg(long, env = "MAZE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Grid side as a function of level: `base + growth * level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    base: usize,
    growth: usize,
}

impl Sizing {
    pub fn new(base: usize, growth: usize) -> Result<Self> {
        if growth == 0 {
            return Err(MazeError::InvalidGrowth);
        }
        Ok(Self { base, growth })
    }

    pub fn side(&self, level: u32) -> Result<usize> {
        let level_cells = usize::try_from(level)
            .ok()
            .and_then(|l| self.growth.checked_mul(l))
            .ok_or(MazeError::SizeOverflow { level })?;
        let side = self
            .base
            .checked_add(level_cells)
            .ok_or(MazeError::SizeOverflow { level })?;
        if side == 0 {
            return Err(MazeError::InvalidDimensions { cols: 0, rows: 0 });
        }
        Ok(side)
    }
}

impl Default for Sizing {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_SIZE,
            growth: DEFAULT_GROWTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub sizing: Sizing,
    pub start_level: u32,
    pub seed: Option<u64>,
    pub pause: Duration,
    pub frame_time: Duration,
    pub log_file: Option<PathBuf>,
}

impl GameConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        let sizing = Sizing::new(args.base_size, args.growth)?;
        // Fail before the terminal is taken over.
        sizing.side(args.level)?;
        Ok(Self {
            sizing,
            start_level: args.level,
            seed: args.seed,
            pause: Duration::from_millis(args.pause_ms),
            frame_time: Duration::from_micros(1_000_000 / args.fps.max(1)),
            log_file: args.log_file,
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sizing: Sizing::default(),
            start_level: 1,
            seed: None,
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            frame_time: Duration::from_micros(1_000_000 / DEFAULT_RENDER_FPS),
            log_file: None,
        }
    }
}
