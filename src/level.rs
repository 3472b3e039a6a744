use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

use crate::components::Dir;
use crate::config::{GameConfig, Sizing};
use crate::error::Result;
use crate::maze::generate_maze;
use crate::player::{MoveReport, Session};

/// Builds a fresh square maze for `level` with the player at the entrance.
pub fn setup<R: Rng + ?Sized>(level: u32, sizing: &Sizing, rng: &mut R) -> Result<Session> {
    let side = sizing.side(level)?;
    let grid = generate_maze(rng, side, side)?;
    Ok(Session::new(grid))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Exit reached; the next level is built once `until` passes.
    Transitioning { until: Instant, next_level: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    Completed { level: u32 },
    Changed { level: u32 },
}

pub struct LevelController<R> {
    level: u32,
    phase: Phase,
    session: Session,
    sizing: Sizing,
    pause: Duration,
    rng: R,
}

impl<R: Rng> LevelController<R> {
    pub fn new(config: &GameConfig, mut rng: R) -> Result<Self> {
        let session = setup(config.start_level, &config.sizing, &mut rng)?;
        info!(
            "level {} ready ({}x{})",
            config.start_level,
            session.grid().cols(),
            session.grid().rows()
        );
        Ok(Self {
            level: config.start_level,
            phase: Phase::Playing,
            session,
            sizing: config.sizing,
            pause: config.pause,
            rng,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Forwards a move to the navigator. Ignored while transitioning.
    ///
    /// A single-cell maze starts on its exit with every side walled, so any
    /// move attempt there completes the level.
    pub fn handle_move(&mut self, dir: Dir, now: Instant) -> (Option<MoveReport>, Option<LevelEvent>) {
        if self.is_transitioning() {
            debug!("ignoring {:?} during level transition", dir);
            return (None, None);
        }
        let report = self.session.attempt_move(dir);
        if !report.reached_exit && !self.session.at_exit() {
            return (Some(report), None);
        }

        let next_level = self.level.saturating_add(1);
        self.phase = Phase::Transitioning {
            until: now + self.pause,
            next_level,
        };
        info!("level {} complete", self.level);
        (Some(report), Some(LevelEvent::Completed { level: self.level }))
    }

    /// Fires the pending transition once its pause has elapsed.
    pub fn tick(&mut self, now: Instant) -> Result<Option<LevelEvent>> {
        match self.phase {
            Phase::Transitioning { until, next_level } if now >= until => {
                self.load(next_level).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// User-requested re-setup. Supersedes a pending transition by building
    /// its level right away; otherwise rebuilds the current level.
    pub fn restart(&mut self) -> Result<Option<LevelEvent>> {
        match self.phase {
            Phase::Transitioning { next_level, .. } => self.load(next_level).map(Some),
            Phase::Playing => {
                let level = self.level;
                self.load(level)?;
                Ok(None)
            }
        }
    }

    /// Terminal resize. The maze in play is kept; a pending transition is
    /// superseded the same way as in `restart`.
    pub fn resize(&mut self) -> Result<Option<LevelEvent>> {
        match self.phase {
            Phase::Transitioning { next_level, .. } => self.load(next_level).map(Some),
            Phase::Playing => Ok(None),
        }
    }

    fn load(&mut self, level: u32) -> Result<LevelEvent> {
        // Build before touching state so a failure keeps the current level.
        let session = setup(level, &self.sizing, &mut self.rng)?;
        info!(
            "level {} ready ({}x{})",
            level,
            session.grid().cols(),
            session.grid().rows()
        );
        self.session = session;
        self.level = level;
        self.phase = Phase::Playing;
        Ok(LevelEvent::Changed { level })
    }
}
