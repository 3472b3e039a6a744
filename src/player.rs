use log::trace;

use crate::components::{Dir, Pos};
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A wall (or the grid edge) was in the way; nothing changed.
    Blocked,
    Advanced,
    /// The player stepped back onto the previous trail cell.
    Backtracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub reached_exit: bool,
}

impl MoveReport {
    pub fn moved(&self) -> bool {
        self.outcome != MoveOutcome::Blocked
    }
}

/// The player's trail from the entrance. Never empty; the last entry is the
/// player position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trail {
    steps: Vec<Pos>,
}

impl Trail {
    pub fn new(start: Pos) -> Self {
        Self { steps: vec![start] }
    }

    pub fn steps(&self) -> &[Pos] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn head(&self) -> Pos {
        self.steps[self.steps.len() - 1]
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.steps.contains(&pos)
    }

    fn record(&mut self, next: Pos) -> MoveOutcome {
        let n = self.steps.len();
        if n >= 2 && self.steps[n - 2] == next {
            self.steps.pop();
            MoveOutcome::Backtracked
        } else {
            self.steps.push(next);
            MoveOutcome::Advanced
        }
    }
}

/// State of one level: the generated maze and the player's trail through it.
#[derive(Debug, Clone)]
pub struct Session {
    grid: Grid,
    trail: Trail,
}

impl Session {
    pub fn new(grid: Grid) -> Self {
        let trail = Trail::new(grid.entrance());
        Self { grid, trail }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn player(&self) -> Pos {
        self.trail.head()
    }

    pub fn exit(&self) -> Pos {
        self.grid.exit()
    }

    pub fn at_exit(&self) -> bool {
        self.player() == self.exit()
    }

    pub fn attempt_move(&mut self, dir: Dir) -> MoveReport {
        let from = self.player();
        let next = match self.grid.neighbor(from, dir) {
            Some(next) if !self.grid.has_wall(from, dir) => next,
            _ => {
                trace!("move {:?} from {:?} blocked", dir, from);
                return MoveReport {
                    outcome: MoveOutcome::Blocked,
                    reached_exit: false,
                };
            }
        };

        let outcome = self.trail.record(next);
        MoveReport {
            outcome,
            reached_exit: next == self.grid.exit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate_maze;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn known_session() -> Session {
        Session::new(generate_maze(&mut StepRng::new(0, 0), 3, 3).unwrap())
    }

    #[test]
    fn walks_known_maze_to_exit() {
        let mut session = known_session();
        let moves = [Dir::Right, Dir::Right, Dir::Down, Dir::Down];
        let reports: Vec<MoveReport> = moves.iter().map(|d| session.attempt_move(*d)).collect();

        assert!(reports.iter().all(|r| r.outcome == MoveOutcome::Advanced));
        assert!(reports[..3].iter().all(|r| !r.reached_exit));
        assert!(reports[3].reached_exit);
        assert_eq!(session.player(), Pos::new(2, 2));
        assert_eq!(session.trail().len(), 5);
        assert!(session.at_exit());
    }

    #[test]
    fn boundary_moves_at_entrance_are_blocked() {
        let mut session = known_session();
        for dir in [Dir::Up, Dir::Left] {
            let report = session.attempt_move(dir);
            assert_eq!(report.outcome, MoveOutcome::Blocked);
            assert!(!report.moved());
            assert_eq!(session.player(), Pos::new(0, 0));
            assert_eq!(session.trail().steps(), &[Pos::new(0, 0)]);
        }
    }

    #[test]
    fn wall_leaves_state_untouched() {
        let mut session = known_session();
        session.attempt_move(Dir::Right);
        // (1, 0) -> (1, 1) is walled in the known layout.
        let before_trail = session.trail().clone();
        let before_cells = session.grid().cells().to_vec();
        let report = session.attempt_move(Dir::Down);
        assert_eq!(report.outcome, MoveOutcome::Blocked);
        assert_eq!(session.trail(), &before_trail);
        assert_eq!(session.grid().cells(), &before_cells[..]);
    }

    #[test]
    fn forward_then_back_restores_state() {
        let mut session = known_session();
        session.attempt_move(Dir::Right);
        let before = session.trail().clone();

        assert_eq!(session.attempt_move(Dir::Right).outcome, MoveOutcome::Advanced);
        assert_eq!(session.trail().len(), before.len() + 1);
        assert_eq!(session.attempt_move(Dir::Left).outcome, MoveOutcome::Backtracked);
        assert_eq!(session.trail(), &before);
        assert_eq!(session.player(), Pos::new(1, 0));
    }

    #[test]
    fn backtracking_to_entrance_leaves_single_step() {
        let mut session = known_session();
        session.attempt_move(Dir::Right);
        session.attempt_move(Dir::Left);
        assert_eq!(session.trail().steps(), &[Pos::new(0, 0)]);
        // Nothing left to collapse; a fresh step appends again.
        assert_eq!(session.attempt_move(Dir::Down).outcome, MoveOutcome::Blocked);
        assert_eq!(session.attempt_move(Dir::Right).outcome, MoveOutcome::Advanced);
        assert_eq!(session.trail().len(), 2);
    }

    #[test]
    fn single_cell_maze_never_moves() {
        let mut session = Session::new(generate_maze(&mut StdRng::seed_from_u64(3), 1, 1).unwrap());
        assert!(session.at_exit());
        for dir in Dir::ALL {
            assert_eq!(session.attempt_move(dir).outcome, MoveOutcome::Blocked);
        }
    }
}
