//! Cell and move notation.
//!
//! Cells are written as a column letter `a`-`k` followed by a 1-based row
//! number, so `a1` is `(0, 0)` and `k9` is `(10, 8)`. A move is written as
//! the cell the mover lands on; whether that is a placement or a jump
//! follows from the position.

use crate::board::{Action, Isolation, Position, HEIGHT, WIDTH};
use crate::game::GameState;

/// Errors that can occur while reading notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("invalid cell: '{0}'")]
    InvalidCell(String),

    #[error("illegal move '{mv}' at ply {ply}")]
    IllegalMove { mv: String, ply: u32 },

    #[error("move '{mv}' played after the game ended at ply {ply}")]
    GameOver { mv: String, ply: u32 },
}

/// Formats a cell, e.g. `d5`.
pub fn format_cell(pos: Position) -> String {
    let (x, y) = pos.xy();
    format!("{}{}", (b'a' + x as u8) as char, y + 1)
}

/// Parses a cell written as `<column letter><row number>`.
pub fn parse_cell(s: &str) -> Result<Position, NotationError> {
    let invalid = || NotationError::InvalidCell(s.to_string());
    let mut chars = s.chars();
    let col = chars.next().ok_or_else(invalid)?.to_ascii_lowercase();
    if !col.is_ascii_lowercase() {
        return Err(invalid());
    }
    let x = (col as u8 - b'a') as usize;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let row: usize = digits.parse().map_err(|_| invalid())?;
    if x >= WIDTH || row == 0 || row > HEIGHT {
        return Err(invalid());
    }
    Position::from_xy(x, row - 1).ok_or_else(invalid)
}

/// Formats `action` as the cell the side to move would land on.
pub fn format_action(state: &Isolation, action: Action) -> Option<String> {
    state.destination(action).map(format_cell)
}

/// Parses a move for the side to move in `state`.
pub fn parse_action(state: &Isolation, s: &str) -> Result<Action, NotationError> {
    let dest = parse_cell(s)?;
    if state.terminal_test() {
        return Err(NotationError::GameOver {
            mv: s.to_string(),
            ply: state.ply_count(),
        });
    }
    state.action_to(dest).ok_or_else(|| NotationError::IllegalMove {
        mv: s.to_string(),
        ply: state.ply_count(),
    })
}

/// Plays a sequence of moves from `start`.
pub fn apply_moves<T: AsRef<str>>(
    start: Isolation,
    moves: &[T],
) -> Result<Isolation, NotationError> {
    let mut state = start;
    for mv in moves {
        let action = parse_action(&state, mv.as_ref())?;
        state = state.result(action);
    }
    Ok(state)
}
