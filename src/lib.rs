//! islet engine library.
//!
//! Exposes the Isolation board, evaluation heuristics, minimax search,
//! agents, turn supervision, and protocol modules for use by integration
//! tests and the binary entry points.

pub mod agent;
pub mod board;
pub mod config;
pub mod engine;
pub mod eval;
pub mod game;
pub mod protocol;
pub mod search;
pub mod selfplay;
pub mod sink;
pub mod turn;
