//! Single-match runner.
//!
//! Plays one game of Isolation between two agents from the start position.
//! Every turn runs under the turn supervisor with a fixed time budget, and
//! each agent gets back the context it left on its previous turn. The game
//! is written out as one JSON line.

use std::io::Write;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::Agent;
use crate::board::Isolation;
use crate::game::{GameState, PlayerId};
use crate::protocol::notation::format_cell;
use crate::turn::run_turn;

/// Default per-turn time budget in milliseconds.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 150;

/// Configuration for one match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Time budget per turn (milliseconds).
    pub time_limit_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The loser had no legal move.
    Isolated,
    /// The loser left the sink empty at the deadline.
    Timeout,
    /// The loser returned an error, panicked, or finished without a move.
    AgentError,
    /// The loser chose a move that is not legal.
    IllegalAction,
}

/// A completed match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Agent names, indexed by player id.
    pub players: [String; 2],
    pub winner: PlayerId,
    pub reason: EndReason,
    /// Moves actually played.
    pub plies: u32,
    /// Destination cells in play order.
    pub moves: Vec<String>,
    pub elapsed_ms: u64,
}

/// Plays one match. `agents[i]` moves for player `i`.
pub fn play_match(agents: [Box<dyn Agent<Isolation>>; 2], config: &MatchConfig) -> MatchRecord {
    let players = [agents[0].name().to_string(), agents[1].name().to_string()];
    let mut seats = agents.map(Some);
    let mut contexts: [Option<Value>; 2] = [None, None];
    let limit = Duration::from_millis(config.time_limit_ms);
    let start = Instant::now();

    let mut state = Isolation::new();
    let mut moves = Vec::new();

    let (loser, reason) = loop {
        let player = state.player();
        if state.terminal_test() {
            break (player, EndReason::Isolated);
        }

        let idx = player.index();
        let mut agent = match seats[idx].take() {
            Some(agent) => agent,
            None => {
                log::warn!("{} ({}) was lost to a panic", player, players[idx]);
                break (player, EndReason::AgentError);
            }
        };
        agent.set_context(contexts[idx].take());

        let (agent, turn) = run_turn(agent, state, limit);
        if let Some(agent) = agent {
            contexts[idx] = agent.context().cloned();
            seats[idx] = Some(agent);
        }

        // An error raised after the deadline does not cancel the snapshot.
        let action = match turn.action {
            Some(action) if turn.error.is_none() || turn.timed_out => action,
            None if turn.timed_out => {
                log::info!("{} ({}) timed out after {:?}", player, players[idx], turn.elapsed);
                break (player, EndReason::Timeout);
            }
            _ => {
                match &turn.error {
                    Some(e) => log::warn!("{} ({}): {}", player, players[idx], e),
                    None => log::warn!("{} ({}) returned without a move", player, players[idx]),
                }
                break (player, EndReason::AgentError);
            }
        };

        let dest = match state.destination(action) {
            Some(dest) if state.is_open(dest) => dest,
            _ => {
                log::warn!(
                    "{} ({}) chose illegal action {:?} at ply {}",
                    player,
                    players[idx],
                    action,
                    state.ply_count()
                );
                break (player, EndReason::IllegalAction);
            }
        };
        moves.push(format_cell(dest));
        state = state.result(action);
    };

    let record = MatchRecord {
        players,
        winner: loser.opponent(),
        reason,
        plies: state.ply_count(),
        moves,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    log::info!(
        "{} wins by {:?} after {} plies",
        record.winner,
        record.reason,
        record.plies
    );
    record
}

/// Writes `record` as a single JSON line.
pub fn write_jsonl<W: Write>(record: &MatchRecord, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    writeln!(out)?;
    out.flush()
}
