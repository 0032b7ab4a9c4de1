//! Tetromino templates, shape matrices and piece providers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Colors
// ============================================================================

/// Opaque color identifier stored in settled grid cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceColor {
    Cyan,
    Yellow,
    Purple,
    Orange,
    Blue,
    Green,
    Red,
}

impl PieceColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            PieceColor::Cyan => (0x00, 0xf0, 0xf0),
            PieceColor::Yellow => (0xf0, 0xf0, 0x00),
            PieceColor::Purple => (0xa0, 0x00, 0xf0),
            PieceColor::Orange => (0xf0, 0xa0, 0x00),
            PieceColor::Blue => (0x00, 0x00, 0xf0),
            PieceColor::Green => (0x00, 0xf0, 0x00),
            PieceColor::Red => (0xf0, 0x00, 0x00),
        }
    }
}

// ============================================================================
// Shapes
// ============================================================================

/// Rectangular occupancy matrix, indexed `[row][col]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    cells: Vec<Vec<bool>>,
}

impl Shape {
    /// Builds a shape from rows of 0/1 values.
    ///
    /// Rows are expected to share one length; the matrix must not be empty.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        Self {
            cells: rows
                .iter()
                .map(|row| row.iter().map(|&v| v != 0).collect())
                .collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Occupied cells as `(row, col)` offsets from the top-left of the bounding box.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(c, _)| (r, c))
        })
    }

    /// Clockwise quarter turn: transpose, then reverse each new row.
    pub fn rotated(&self) -> Self {
        let height = self.height();
        let cells = (0..self.width())
            .map(|i| (0..height).map(|j| self.cells[height - 1 - j][i]).collect())
            .collect();
        Self { cells }
    }
}

// ============================================================================
// Tetromino Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoType {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::L,
        TetrominoType::J,
        TetrominoType::S,
        TetrominoType::Z,
    ];

    /// Spawn template for this type.
    pub fn shape(&self) -> Shape {
        match self {
            TetrominoType::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            TetrominoType::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            TetrominoType::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            TetrominoType::L => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            TetrominoType::J => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
            TetrominoType::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            TetrominoType::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
        }
    }

    pub fn color(&self) -> PieceColor {
        match self {
            TetrominoType::I => PieceColor::Cyan,
            TetrominoType::O => PieceColor::Yellow,
            TetrominoType::T => PieceColor::Purple,
            TetrominoType::L => PieceColor::Orange,
            TetrominoType::J => PieceColor::Blue,
            TetrominoType::S => PieceColor::Green,
            TetrominoType::Z => PieceColor::Red,
        }
    }
}

// ============================================================================
// Piece
// ============================================================================

/// The active piece: a shape placed at `(x, y)`, the top-left of its bounding box.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    pub shape: Shape,
    pub color: PieceColor,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn new(tetromino_type: TetrominoType, x: i32, y: i32) -> Self {
        Self {
            shape: tetromino_type.shape(),
            color: tetromino_type.color(),
            x,
            y,
        }
    }

    /// Spawn position for a grid `cols` wide: `x = floor(cols / 2) - 1`, `y = 0`.
    pub fn spawn(tetromino_type: TetrominoType, cols: usize) -> Self {
        Self::new(tetromino_type, (cols / 2) as i32 - 1, 0)
    }

    /// Absolute grid coordinates `(x, y)` of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied()
            .map(|(r, c)| (self.x + c as i32, self.y + r as i32))
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Uniform choice over the seven templates. No bag.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::ALL[self.rng.gen_range(0..TetrominoType::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    /// Cycles through `pieces`, which must not be empty.
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
