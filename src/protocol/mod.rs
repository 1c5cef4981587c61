//! IEP (Isolation Engine Protocol) handling.
//!
//! A line-oriented stdin/stdout protocol in the style of UCI: the command
//! parser for the main loop and the cell notation used for moves.

pub mod notation;
pub mod parser;

pub use notation::{
    apply_moves, format_action, format_cell, parse_action, parse_cell, NotationError,
};
pub use parser::{parse_command, Command, GoParams};
