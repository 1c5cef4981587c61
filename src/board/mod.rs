//! Board representation for knight's Isolation.
//!
//! Contains cell positions and coordinate decoding, the knight moves, and the
//! immutable game state that implements [`crate::game::GameState`].

pub mod action;
pub mod position;
pub mod state;

pub use action::{Action, Knight};
pub use position::{Position, CELL_COUNT, HEIGHT, ROW_STRIDE, WIDTH};
pub use state::Isolation;
