//! Moves on the Isolation board.

use serde::{Deserialize, Serialize};

use super::position::Position;

/// One of the eight knight jumps, named by compass heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Knight {
    NNE,
    ENE,
    ESE,
    SSE,
    SSW,
    WSW,
    WNW,
    NNW,
}

impl Knight {
    /// All jumps in enumeration order.
    pub const ALL: [Knight; 8] = [
        Knight::NNE,
        Knight::ENE,
        Knight::ESE,
        Knight::SSE,
        Knight::SSW,
        Knight::WSW,
        Knight::WNW,
        Knight::NNW,
    ];

    /// Column and row displacement of the jump.
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Knight::NNE => (1, 2),
            Knight::ENE => (2, 1),
            Knight::ESE => (2, -1),
            Knight::SSE => (1, -2),
            Knight::SSW => (-1, -2),
            Knight::WSW => (-2, -1),
            Knight::WNW => (-2, 1),
            Knight::NNW => (-1, 2),
        }
    }

    /// The cell reached by jumping from `from`, if it is on the board.
    pub fn target(self, from: Position) -> Option<Position> {
        let (dx, dy) = self.delta();
        from.offset(dx, dy)
    }
}

/// A move by the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// First move of a player: put the knight on an open cell.
    Place(Position),
    /// Any later move: a knight jump from the current cell.
    Jump(Knight),
}
