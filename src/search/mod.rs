//! Search and planning.
//!
//! Fixed-depth minimax over the game tree, scoring cut-off nodes with an
//! [`Evaluator`](crate::eval::Evaluator) and terminal nodes with the game
//! utility.

pub mod minimax;

pub use minimax::{
    max_value, min_value, minimax_decision, par_minimax_decision, SearchError, SearchResult,
    SearchStats,
};
