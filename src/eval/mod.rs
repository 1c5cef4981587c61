//! Position evaluation.
//!
//! Static scores of a game state from an explicit player's perspective,
//! used by search when it stops before a terminal state.

pub mod heuristic;

pub use heuristic::{
    baseline, distance_score, euclidean_distance, liberty_count, weighted_composite, Heuristic,
    UnknownHeuristic, Weights,
};

use crate::game::{GameState, PlayerId};

/// Scores `state` for `player`; higher is better for `player`.
///
/// Implemented by [`Heuristic`] and by any `Fn(&S, PlayerId) -> f64`.
pub trait Evaluator<S: GameState> {
    fn evaluate(&self, state: &S, player: PlayerId) -> f64;
}

impl<S, F> Evaluator<S> for F
where
    S: GameState,
    F: Fn(&S, PlayerId) -> f64,
{
    #[inline]
    fn evaluate(&self, state: &S, player: PlayerId) -> f64 {
        self(state, player)
    }
}

impl<S: GameState> Evaluator<S> for Heuristic {
    fn evaluate(&self, state: &S, player: PlayerId) -> f64 {
        match self {
            Heuristic::Liberties => liberty_count(state, player),
            Heuristic::Baseline => baseline(state, player),
            Heuristic::Distance => distance_score(state, player),
            Heuristic::Composite(weights) => weighted_composite(state, player, weights),
        }
    }
}
