//! Game-playing agents.
//!
//! An agent is asked for a move once per turn and answers by depositing an
//! action in an [`ActionSink`]. Each agent is bound to one player id and
//! refuses to move for the other side.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AgentConfig;
use crate::eval::{Evaluator, Heuristic};
use crate::game::{GameState, PlayerId};
use crate::search::{minimax_decision, par_minimax_decision, SearchError, SearchResult};
use crate::sink::ActionSink;

/// Errors raised while choosing an action.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("{agent} was asked to move but {to_move} is on turn")]
    NotOnTurn { agent: PlayerId, to_move: PlayerId },

    #[error("no legal actions available")]
    NoActions,

    #[error("failed to encode context: {0}")]
    Context(#[from] serde_json::Error),

    #[error("agent thread panicked")]
    Panicked,
}

/// A player that chooses one action per turn.
pub trait Agent<S: GameState>: Send {
    /// Display name.
    fn name(&self) -> &str;

    /// The player this agent moves for.
    fn player_id(&self) -> PlayerId;

    /// Chooses an action for `state` and deposits it in `sink`.
    ///
    /// Must deposit at least once before returning `Ok`. May deposit more
    /// than once; the caller keeps the last deposit made before its deadline.
    fn get_action(&mut self, state: &S, sink: &ActionSink<S::Action>) -> Result<(), AgentError>;

    /// Payload the agent wants handed back on its next turn.
    fn context(&self) -> Option<&Value> {
        None
    }

    /// Receives the payload stored after the agent's previous turn.
    fn set_context(&mut self, _context: Option<Value>) {}
}

fn check_turn<S: GameState>(agent: PlayerId, state: &S) -> Result<(), AgentError> {
    let to_move = state.player();
    if to_move != agent {
        return Err(AgentError::NotOnTurn { agent, to_move });
    }
    Ok(())
}

/// What the minimax agent remembers between its own turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Decisions made so far this game.
    pub turns: u32,
    /// Minimax value of the last decision.
    pub score: f64,
    /// Nodes visited by the last decision.
    pub nodes: u64,
}

/// Fixed-depth minimax agent.
pub struct MinimaxPlayer {
    player_id: PlayerId,
    config: AgentConfig,
    context: Option<Value>,
}

impl MinimaxPlayer {
    pub fn new(player_id: PlayerId, config: AgentConfig) -> Self {
        MinimaxPlayer {
            player_id,
            config,
            context: None,
        }
    }

    /// Runs the configured search without touching a sink.
    pub fn decide<S>(&self, state: &S) -> Result<SearchResult<S::Action>, AgentError>
    where
        S: GameState + Send + Sync,
        S::Action: Send + Sync,
    {
        check_turn(self.player_id, state)?;
        let config = &self.config;
        let result = if config.parallel {
            par_minimax_decision(state, config.depth, self.player_id, &config.heuristic)?
        } else {
            minimax_decision(state, config.depth, self.player_id, &config.heuristic)?
        };
        Ok(result)
    }

    /// Summary left by the previous turn. A payload that does not decode is
    /// dropped.
    fn previous_summary(&self) -> Option<TurnSummary> {
        let value = self.context.clone()?;
        match serde_json::from_value(value) {
            Ok(summary) => Some(summary),
            Err(e) => {
                log::warn!("{}: ignoring unreadable context: {}", self.player_id, e);
                None
            }
        }
    }
}

impl<S> Agent<S> for MinimaxPlayer
where
    S: GameState + Send + Sync,
    S::Action: Send + Sync,
{
    fn name(&self) -> &str {
        "minimax"
    }

    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn get_action(&mut self, state: &S, sink: &ActionSink<S::Action>) -> Result<(), AgentError> {
        let previous = self.previous_summary().unwrap_or_default();
        let result = self.decide(state)?;
        sink.put(result.action);

        log::debug!(
            "{} turn {}: {:?} score {:.4} (previous {:.4}) {}",
            self.player_id,
            previous.turns + 1,
            result.action,
            result.score,
            previous.score,
            result.info_line()
        );
        let summary = TurnSummary {
            turns: previous.turns + 1,
            score: result.score,
            nodes: result.stats.nodes,
        };
        self.context = Some(serde_json::to_value(summary)?);
        Ok(())
    }

    fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    fn set_context(&mut self, context: Option<Value>) {
        self.context = context;
    }
}

/// One-ply agent: plays the move whose resulting state scores best.
pub struct GreedyPlayer {
    player_id: PlayerId,
    heuristic: Heuristic,
}

impl GreedyPlayer {
    pub fn new(player_id: PlayerId, heuristic: Heuristic) -> Self {
        GreedyPlayer {
            player_id,
            heuristic,
        }
    }
}

impl<S: GameState> Agent<S> for GreedyPlayer {
    fn name(&self) -> &str {
        "greedy"
    }

    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn get_action(&mut self, state: &S, sink: &ActionSink<S::Action>) -> Result<(), AgentError> {
        check_turn(self.player_id, state)?;
        let mut best: Option<(S::Action, f64)> = None;
        for action in state.actions() {
            let score = self.heuristic.evaluate(&state.result(action), self.player_id);
            match best {
                Some((_, best_score)) if !(score > best_score) => {}
                _ => best = Some((action, score)),
            }
        }
        let (action, _) = best.ok_or(AgentError::NoActions)?;
        sink.put(action);
        Ok(())
    }
}

/// Plays a uniformly random legal move.
pub struct RandomPlayer {
    player_id: PlayerId,
    rng: SmallRng,
}

impl RandomPlayer {
    /// Seeds from entropy when `seed` is `None`.
    pub fn new(player_id: PlayerId, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        RandomPlayer { player_id, rng }
    }
}

impl<S: GameState> Agent<S> for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn get_action(&mut self, state: &S, sink: &ActionSink<S::Action>) -> Result<(), AgentError> {
        check_turn(self.player_id, state)?;
        let actions = state.actions();
        let action = actions.choose(&mut self.rng).ok_or(AgentError::NoActions)?;
        sink.put(*action);
        Ok(())
    }
}
