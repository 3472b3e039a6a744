use log::debug;
use rand::Rng;

use crate::components::{Dir, Pos};
use crate::error::Result;
use crate::grid::Grid;

/// Builds a `cols` x `rows` grid and carves a perfect maze into it.
pub fn generate_maze<R: Rng + ?Sized>(rng: &mut R, cols: usize, rows: usize) -> Result<Grid> {
    let mut grid = Grid::new(cols, rows)?;
    let carved = carve_spanning_tree(&mut grid, rng)?;
    debug!("generated {}x{} maze with {} passages", cols, rows, carved);
    Ok(grid)
}

/// Iterative depth-first backtracker starting at the entrance.
///
/// Expects a freshly created grid. Every cell ends up visited and exactly
/// `len - 1` wall pairs are removed; the return value is that count.
pub fn carve_spanning_tree<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<usize> {
    let mut current = grid.entrance();
    let mut stack = vec![current];
    let mut carved = 0;
    grid.mark_visited(current);

    while !stack.is_empty() {
        let candidates = unvisited_neighbors(grid, current);
        if candidates.is_empty() {
            match stack.pop() {
                Some(prev) => current = prev,
                None => break,
            }
            continue;
        }

        let next = candidates[rng.gen_range(0..candidates.len())];
        grid.mark_visited(next);
        stack.push(current);
        grid.carve(current, next)?;
        carved += 1;
        current = next;
    }

    Ok(carved)
}

fn unvisited_neighbors(grid: &Grid, pos: Pos) -> Vec<Pos> {
    let mut out = Vec::with_capacity(4);
    for dir in Dir::ALL {
        if let Some(next) = grid.neighbor(pos, dir) {
            if !grid.is_visited(next) {
                out.push(next);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    fn reachable_from_entrance(grid: &Grid) -> usize {
        let mut seen = vec![false; grid.len()];
        let mut q = VecDeque::new();
        seen[0] = true;
        q.push_back(grid.entrance());
        let mut count = 1;
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ALL {
                if grid.has_wall(pos, dir) {
                    continue;
                }
                if let Some(next) = grid.neighbor(pos, dir) {
                    let idx = grid.pos_index(next).unwrap();
                    if !seen[idx] {
                        seen[idx] = true;
                        count += 1;
                        q.push_back(next);
                    }
                }
            }
        }
        count
    }

    #[test]
    fn single_cell_needs_no_carving() {
        let mut grid = Grid::new(1, 1).unwrap();
        let carved = carve_spanning_tree(&mut grid, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(carved, 0);
        assert_eq!(grid.cells()[0].walls(), [true; 4]);
        assert!(grid.cells()[0].is_visited());
    }

    #[test]
    fn carves_a_spanning_tree() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let grid = generate_maze(&mut rng, 9, 7).unwrap();
            assert_eq!(grid.passage_count(), 9 * 7 - 1);
            assert_eq!(reachable_from_entrance(&grid), 9 * 7);
            assert!(grid.cells().iter().all(|c| c.is_visited()));
        }
    }

    #[test]
    fn boundary_walls_stay_intact() {
        let grid = generate_maze(&mut StdRng::seed_from_u64(7), 6, 5).unwrap();
        for x in 0..6 {
            assert!(grid.has_wall(Pos::new(x, 0), Dir::Up));
            assert!(grid.has_wall(Pos::new(x, 4), Dir::Down));
        }
        for y in 0..5 {
            assert!(grid.has_wall(Pos::new(0, y), Dir::Left));
            assert!(grid.has_wall(Pos::new(5, y), Dir::Right));
        }
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate_maze(&mut StdRng::seed_from_u64(42), 12, 12).unwrap();
        let b = generate_maze(&mut StdRng::seed_from_u64(42), 12, 12).unwrap();
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn first_choice_source_gives_known_layout() {
        // Always picks the first candidate in Up, Right, Down, Left order.
        let grid = generate_maze(&mut StepRng::new(0, 0), 3, 3).unwrap();
        let open = |x, y, dir| !grid.has_wall(Pos::new(x, y), dir);
        assert!(open(0, 0, Dir::Right));
        assert!(open(1, 0, Dir::Right));
        assert!(open(2, 0, Dir::Down));
        assert!(open(2, 1, Dir::Down));
        assert!(open(2, 2, Dir::Left));
        assert!(open(1, 2, Dir::Up));
        assert!(open(1, 1, Dir::Left));
        assert!(open(0, 1, Dir::Down));
        assert_eq!(grid.passage_count(), 8);
    }

    #[test]
    fn first_carve_picks_right_and_down_evenly() {
        // In a 2x2 maze the entrance keeps exactly one opening: its first carve.
        let trials = 2000;
        let mut right = 0;
        for seed in 0..trials {
            let grid = generate_maze(&mut StdRng::seed_from_u64(seed), 2, 2).unwrap();
            let entrance = grid.entrance();
            let went_right = !grid.has_wall(entrance, Dir::Right);
            let went_down = !grid.has_wall(entrance, Dir::Down);
            assert!(went_right != went_down);
            if went_right {
                right += 1;
            }
        }
        assert!((850..=1150).contains(&right), "right chosen {} of {}", right, trials);
    }

    #[test]
    fn rejects_empty_grid() {
        assert!(generate_maze(&mut StdRng::seed_from_u64(0), 0, 3).is_err());
    }
}
