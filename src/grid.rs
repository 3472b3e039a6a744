use crate::components::{step, Dir, Pos};
use crate::error::{MazeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    walls: [bool; 4],
    visited: bool,
}

impl Cell {
    fn new() -> Self {
        Self {
            walls: [true; 4],
            visited: false,
        }
    }

    pub fn has_wall(&self, dir: Dir) -> bool {
        self.walls[dir.wall()]
    }

    /// Wall flags in `Up, Right, Down, Left` order.
    pub fn walls(&self) -> [bool; 4] {
        self.walls
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }
}

/// Row-major grid of cells. Only the maze generator mutates it.
#[derive(Debug, Clone)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(MazeError::InvalidDimensions { cols, rows });
        }
        let len = cols
            .checked_mul(rows)
            .ok_or(MazeError::InvalidDimensions { cols, rows })?;
        Ok(Self {
            cols,
            rows,
            cells: vec![Cell::new(); len],
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Linear offset `x + y * cols`, or `None` outside the grid.
    pub fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(x + y * self.cols)
    }

    pub fn pos_index(&self, pos: Pos) -> Option<usize> {
        if pos.x >= self.cols || pos.y >= self.rows {
            return None;
        }
        Some(pos.x + pos.y * self.cols)
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new(index % self.cols, index / self.cols)
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.pos_index(pos).map(|idx| &self.cells[idx])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Positions outside the grid read as walled on every side.
    pub fn has_wall(&self, pos: Pos, dir: Dir) -> bool {
        self.cell(pos).map_or(true, |cell| cell.has_wall(dir))
    }

    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        step(pos, dir).filter(|next| self.pos_index(*next).is_some())
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.pos_index(pos).is_some()
    }

    pub fn entrance(&self) -> Pos {
        Pos::new(0, 0)
    }

    pub fn exit(&self) -> Pos {
        Pos::new(self.cols - 1, self.rows - 1)
    }

    /// Number of removed wall pairs between adjacent cells.
    pub fn passage_count(&self) -> usize {
        let mut open = 0;
        for (idx, cell) in self.cells.iter().enumerate() {
            let pos = self.pos_of(idx);
            if pos.x + 1 < self.cols && !cell.has_wall(Dir::Right) {
                open += 1;
            }
            if pos.y + 1 < self.rows && !cell.has_wall(Dir::Down) {
                open += 1;
            }
        }
        open
    }

    pub(crate) fn is_visited(&self, pos: Pos) -> bool {
        self.cell(pos).map_or(false, Cell::is_visited)
    }

    pub(crate) fn mark_visited(&mut self, pos: Pos) {
        if let Some(idx) = self.pos_index(pos) {
            self.cells[idx].visited = true;
        }
    }

    /// Removes the wall pair shared by two adjacent cells.
    pub(crate) fn carve(&mut self, a: Pos, b: Pos) -> Result<()> {
        let (ia, ib) = match (self.pos_index(a), self.pos_index(b)) {
            (Some(ia), Some(ib)) => (ia, ib),
            _ => return Err(MazeError::NotAdjacent { a, b }),
        };
        let dir = Dir::between(a, b).ok_or(MazeError::NotAdjacent { a, b })?;
        self.cells[ia].walls[dir.wall()] = false;
        self.cells[ib].walls[dir.opposite().wall()] = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 4),
            Err(MazeError::InvalidDimensions { cols: 0, rows: 4 })
        ));
        assert!(matches!(
            Grid::new(4, 0),
            Err(MazeError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn starts_fully_walled_and_unvisited() {
        let grid = Grid::new(3, 2).unwrap();
        assert_eq!(grid.len(), 6);
        assert!(grid.cells().iter().all(|c| c.walls() == [true; 4]));
        assert!(grid.cells().iter().all(|c| !c.is_visited()));
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn index_is_row_major_with_out_of_bounds_sentinel() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.index(0, 0), Some(0));
        assert_eq!(grid.index(3, 0), Some(3));
        assert_eq!(grid.index(1, 2), Some(9));
        assert_eq!(grid.index(-1, 0), None);
        assert_eq!(grid.index(0, -1), None);
        assert_eq!(grid.index(4, 0), None);
        assert_eq!(grid.index(0, 3), None);
        for idx in 0..grid.len() {
            let pos = grid.pos_of(idx);
            assert_eq!(grid.pos_index(pos), Some(idx));
        }
    }

    #[test]
    fn carve_removes_both_sides() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.carve(Pos::new(1, 0), Pos::new(0, 0)).unwrap();
        assert!(!grid.has_wall(Pos::new(0, 0), Dir::Right));
        assert!(!grid.has_wall(Pos::new(1, 0), Dir::Left));

        grid.carve(Pos::new(1, 0), Pos::new(1, 1)).unwrap();
        assert!(!grid.has_wall(Pos::new(1, 0), Dir::Down));
        assert!(!grid.has_wall(Pos::new(1, 1), Dir::Up));
        assert_eq!(grid.passage_count(), 2);
    }

    #[test]
    fn carve_rejects_non_adjacent_cells() {
        let mut grid = Grid::new(3, 3).unwrap();
        let err = grid.carve(Pos::new(0, 0), Pos::new(1, 1)).unwrap_err();
        assert!(matches!(err, MazeError::NotAdjacent { .. }));
        assert!(grid.carve(Pos::new(2, 2), Pos::new(3, 2)).is_err());
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn outside_reads_as_wall() {
        let grid = Grid::new(2, 2).unwrap();
        assert!(grid.has_wall(Pos::new(5, 5), Dir::Left));
        assert_eq!(grid.neighbor(Pos::new(1, 1), Dir::Right), None);
        assert_eq!(grid.neighbor(Pos::new(0, 0), Dir::Up), None);
        assert_eq!(grid.neighbor(Pos::new(0, 0), Dir::Down), Some(Pos::new(0, 1)));
    }
}
