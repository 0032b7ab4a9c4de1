//! Settled-cell matrix, collision checks, merging and line clearing.

use crate::piece::{Piece, PieceColor, Shape};

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 12;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(PieceColor),
}

impl CellState {
    pub fn is_filled(&self) -> bool {
        matches!(self, CellState::Filled(_))
    }
}

/// Fixed-size board stored as `[row][col]`, row 0 at the top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<CellState>>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![CellState::Empty; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<CellState> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Panics if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, cell: CellState) {
        self.cells[y][x] = cell;
    }

    pub fn row(&self, y: usize) -> &[CellState] {
        &self.cells[y]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.iter().map(Vec::as_slice)
    }

    pub fn is_row_complete(&self, y: usize) -> bool {
        self.cells[y].iter().all(CellState::is_filled)
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.cells[y].iter().filter(|cell| cell.is_filled()).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_filled()).count()
    }

    /// Writes the piece color into every cell it covers. Cells above row 0 are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        let (rows, cols) = (self.rows as i32, self.cols as i32);
        for (x, y) in piece.cells() {
            if y >= 0 && y < rows && x >= 0 && x < cols {
                self.cells[y as usize][x as usize] = CellState::Filled(piece.color);
            }
        }
    }

    /// Removes complete rows, scanning bottom-up, and returns how many were removed.
    ///
    /// Each removal shifts everything above down by one and inserts an empty row at
    /// the top, so the same index is examined again before moving up.
    pub fn clear_lines(&mut self) -> u32 {
        // A zero-width row is vacuously complete and would never stop clearing.
        if self.cols == 0 {
            return 0;
        }
        let mut cleared = 0;
        let mut row = self.rows;

        while row > 0 {
            if self.is_row_complete(row - 1) {
                self.cells.remove(row - 1);
                self.cells.insert(0, vec![CellState::Empty; self.cols]);
                cleared += 1;
            } else {
                row -= 1;
            }
        }

        cleared
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

/// True when `shape` placed at `(x, y)` leaves the side walls, passes the floor, or
/// overlaps a settled cell. Cells above row 0 are only checked against the walls.
pub fn collides(grid: &Grid, shape: &Shape, x: i32, y: i32) -> bool {
    let (rows, cols) = (grid.rows as i32, grid.cols as i32);
    shape.occupied().any(|(r, c)| {
        let bx = x + c as i32;
        let by = y + r as i32;
        if bx < 0 || bx >= cols || by >= rows {
            return true;
        }
        by >= 0 && grid.cells[by as usize][bx as usize].is_filled()
    })
}
