//! The game-state interface consumed by search and evaluation.
//!
//! Search never looks inside a state: it enumerates actions, applies them,
//! and asks for terminal status and utility. Evaluators additionally read
//! player locations and liberties.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Position;

/// Index of a player. Player 0 moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerId(u8);

impl PlayerId {
    pub const FIRST: PlayerId = PlayerId(0);
    pub const SECOND: PlayerId = PlayerId(1);

    /// Returns the player id for an index, or `None` if out of range.
    pub const fn new(index: usize) -> Option<PlayerId> {
        match index {
            0 => Some(PlayerId::FIRST),
            1 => Some(PlayerId::SECOND),
            _ => None,
        }
    }

    /// Returns the array index of this player.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the other player.
    pub const fn opponent(self) -> PlayerId {
        PlayerId(1 - self.0)
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        PlayerId::new(index as usize).ok_or_else(|| format!("invalid player id {}", index))
    }
}

impl From<PlayerId> for u8 {
    fn from(player: PlayerId) -> u8 {
        player.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// A two-player, perfect-information game state.
///
/// Implementations must be immutable values: `result` returns a fresh state
/// and never alters `self`. Action enumeration order must be deterministic,
/// since search breaks ties by first-encountered action.
pub trait GameState: Clone {
    type Action: Copy + PartialEq + fmt::Debug;

    /// Legal actions for the side to move.
    fn actions(&self) -> Vec<Self::Action>;

    /// The successor state after the side to move plays `action`.
    fn result(&self, action: Self::Action) -> Self;

    /// True when the side to move has no legal actions.
    fn terminal_test(&self) -> bool;

    /// Game outcome for `player`: +1 win, -1 loss, 0 when not decided.
    fn utility(&self, player: PlayerId) -> f64;

    /// Location of each player, indexed by player id. `None` until placed.
    fn locs(&self) -> [Option<Position>; 2];

    /// Legal destinations from `loc`. An unplaced player (`None`) may go to
    /// any open cell.
    fn liberties(&self, loc: Option<Position>) -> Vec<Position>;

    /// The side to move.
    fn player(&self) -> PlayerId;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_opponent_flips() {
        assert_eq!(PlayerId::FIRST.opponent(), PlayerId::SECOND);
        assert_eq!(PlayerId::SECOND.opponent(), PlayerId::FIRST);
    }

    #[test]
    fn player_id_new_rejects_out_of_range() {
        assert_eq!(PlayerId::new(0), Some(PlayerId::FIRST));
        assert_eq!(PlayerId::new(1), Some(PlayerId::SECOND));
        assert_eq!(PlayerId::new(2), None);
    }

    #[test]
    fn player_id_serializes_as_index() {
        let json = serde_json::to_string(&PlayerId::SECOND).unwrap();
        assert_eq!(json, "1");
        let back: PlayerId = serde_json::from_str("0").unwrap();
        assert_eq!(back, PlayerId::FIRST);
        assert!(serde_json::from_str::<PlayerId>("2").is_err());
    }
}
