//! Heuristic position evaluation.
//!
//! Mobility and proximity features for knight's Isolation:
//! - liberty count: how many cells the player can jump to next
//! - baseline: own liberties minus opponent liberties
//! - distance: negated Euclidean distance between the knights, so closing
//!   in on the opponent scores higher
//! - composite: weighted blend of distance and liberty differential
//!
//! None of these fail. A knight that is not yet placed contributes zero
//! distance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::{GameState, PlayerId};

/// Default weight of the negated distance term.
pub const DEFAULT_DISTANCE_WEIGHT: f64 = 1.5;

/// Default weight of the liberty differential term.
pub const DEFAULT_MOBILITY_WEIGHT: f64 = 3.0;

/// Coefficients of the composite heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub distance_weight: f64,
    pub mobility_weight: f64,
    pub bias: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            distance_weight: DEFAULT_DISTANCE_WEIGHT,
            mobility_weight: DEFAULT_MOBILITY_WEIGHT,
            bias: 0.0,
        }
    }
}

impl Weights {
    /// `w1 * (-distance) + w2 * (own - opp) + bias`.
    pub fn score(&self, distance: f64, own_liberties: f64, opp_liberties: f64) -> f64 {
        self.distance_weight * -distance
            + self.mobility_weight * (own_liberties - opp_liberties)
            + self.bias
    }
}

/// A named evaluation function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Heuristic {
    Liberties,
    Baseline,
    Distance,
    Composite(Weights),
}

impl Heuristic {
    pub const NAMES: [&'static str; 4] = ["liberties", "baseline", "distance", "composite"];

    pub const fn name(&self) -> &'static str {
        match self {
            Heuristic::Liberties => "liberties",
            Heuristic::Baseline => "baseline",
            Heuristic::Distance => "distance",
            Heuristic::Composite(_) => "composite",
        }
    }
}

impl Default for Heuristic {
    fn default() -> Self {
        Heuristic::Composite(Weights::default())
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a heuristic name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown heuristic '{0}' (expected one of liberties, baseline, distance, composite)")]
pub struct UnknownHeuristic(pub String);

impl FromStr for Heuristic {
    type Err = UnknownHeuristic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "liberties" | "moves" => Ok(Heuristic::Liberties),
            "baseline" => Ok(Heuristic::Baseline),
            "distance" => Ok(Heuristic::Distance),
            "composite" | "weighted" => Ok(Heuristic::default()),
            _ => Err(UnknownHeuristic(s.to_string())),
        }
    }
}

/// Number of cells `player` can move to from its current location.
pub fn liberty_count<S: GameState>(state: &S, player: PlayerId) -> f64 {
    let loc = state.locs()[player.index()];
    state.liberties(loc).len() as f64
}

/// Own liberties minus opponent liberties.
pub fn baseline<S: GameState>(state: &S, player: PlayerId) -> f64 {
    liberty_count(state, player) - liberty_count(state, player.opponent())
}

/// Euclidean distance between the two knights, or 0 if either is unplaced.
pub fn euclidean_distance<S: GameState>(state: &S) -> f64 {
    match state.locs() {
        [Some(a), Some(b)] => a.distance(b),
        _ => 0.0,
    }
}

/// Negated distance between the knights. Symmetric in the players.
pub fn distance_score<S: GameState>(state: &S, _player: PlayerId) -> f64 {
    -euclidean_distance(state)
}

/// Weighted blend of distance and liberty differential.
pub fn weighted_composite<S: GameState>(state: &S, player: PlayerId, weights: &Weights) -> f64 {
    weights.score(
        euclidean_distance(state),
        liberty_count(state, player),
        liberty_count(state, player.opponent()),
    )
}
