//! Cell positions on the Isolation board.
//!
//! Cells are stored as linear indices with two padding columns per row, so
//! a row holds `WIDTH + 2` index slots and `(x, y)` encodes to
//! `x + y * ROW_STRIDE`. Padding slots are never valid positions.

use serde::{Deserialize, Serialize};

/// Number of playable columns.
pub const WIDTH: usize = 11;

/// Number of playable rows.
pub const HEIGHT: usize = 9;

/// Index slots per row, including the two padding columns.
pub const ROW_STRIDE: usize = WIDTH + 2;

/// Number of playable cells.
pub const CELL_COUNT: usize = WIDTH * HEIGHT;

/// A playable cell, identified by its linear index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Position(u8);

impl Position {
    /// Returns the position at a linear index, or `None` for padding or
    /// off-board indices.
    pub const fn from_index(index: usize) -> Option<Position> {
        if index % ROW_STRIDE < WIDTH && index / ROW_STRIDE < HEIGHT {
            Some(Position(index as u8))
        } else {
            None
        }
    }

    /// Returns the position at column `x`, row `y`.
    pub const fn from_xy(x: usize, y: usize) -> Option<Position> {
        if x < WIDTH && y < HEIGHT {
            Some(Position((x + y * ROW_STRIDE) as u8))
        } else {
            None
        }
    }

    /// The linear cell index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Decodes the index into `(column, row)`.
    #[inline]
    pub const fn xy(self) -> (usize, usize) {
        (self.index() % ROW_STRIDE, self.index() / ROW_STRIDE)
    }

    /// Returns the position displaced by `(dx, dy)`, if it stays on the board.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Position> {
        let (x, y) = self.xy();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        Position::from_xy(nx, ny)
    }

    /// Euclidean distance between two cells in board coordinates.
    pub fn distance(self, other: Position) -> f64 {
        let (x1, y1) = self.xy();
        let (x2, y2) = other.xy();
        let dx = x1 as f64 - x2 as f64;
        let dy = y1 as f64 - y2 as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// All playable positions in ascending index order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..ROW_STRIDE * HEIGHT).filter_map(Position::from_index)
    }
}

impl TryFrom<u8> for Position {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Position::from_index(index as usize).ok_or_else(|| format!("invalid cell index {}", index))
    }
}

impl From<Position> for u8 {
    fn from(pos: Position) -> u8 {
        pos.0
    }
}
