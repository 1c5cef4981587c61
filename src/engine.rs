//! Engine state management.
//!
//! Holds the current position, agent configuration and per-side context,
//! and runs the minimax agent for the `go` command. With a move time the
//! agent runs on a worker thread and `go` answers at the deadline;
//! otherwise it runs inline.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::Value;

use crate::agent::{Agent, MinimaxPlayer, TurnSummary};
use crate::board::{Action, Isolation};
use crate::config::{AgentConfig, DEFAULT_DEPTH, MAX_DEPTH};
use crate::eval::{Heuristic, Weights};
use crate::game::GameState;
use crate::protocol::notation::{apply_moves, format_action, NotationError};
use crate::protocol::parser::GoParams;
use crate::sink::ActionSink;
use crate::turn::run_until_deadline;

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub position: Isolation,
    pub config: AgentConfig,
    /// Default time budget for `go`, in milliseconds. `None` runs unbounded.
    pub movetime: Option<u64>,
    context: [Option<Value>; 2],
    rng: SmallRng,
}

/// What the agent produced for one `go`.
struct Decision {
    action: Option<Action>,
    summary: Option<TurnSummary>,
    elapsed: Duration,
}

impl Engine {
    /// Creates an engine at the start position with default options.
    pub fn new() -> Self {
        Engine {
            position: Isolation::new(),
            config: AgentConfig::default(),
            movetime: None,
            context: [None, None],
            rng: SmallRng::from_entropy(),
        }
    }

    /// Resets the position and both sides' context for a new game.
    pub fn new_game(&mut self) {
        self.position = Isolation::new();
        self.context = [None, None];
    }

    /// Sets the position by playing `moves` from the start position.
    /// On error the current position is kept.
    pub fn set_position<T: AsRef<str>>(&mut self, moves: &[T]) -> Result<(), NotationError> {
        self.position = apply_moves(Isolation::new(), moves)?;
        Ok(())
    }

    /// Sets an engine option. Invalid options are logged and ignored.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) {
        if name.eq_ignore_ascii_case("movetime") {
            match value.map(str::parse::<u64>) {
                Some(Ok(0)) => self.movetime = None,
                Some(Ok(ms)) => self.movetime = Some(ms),
                _ => log::warn!("invalid value for option {}: {:?}", name, value),
            }
            return;
        }
        if let Err(e) = self.config.apply_option(name, value) {
            log::warn!("setoption: {}", e);
        }
    }

    /// Handles the IEP handshake: writes id, options, protocol_version, and iepok.
    pub fn handle_iep<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let weights = Weights::default();
        writeln!(out, "id name islet")?;
        writeln!(out, "id author islet")?;
        writeln!(
            out,
            "option name Depth type spin default {} min 1 max {}",
            DEFAULT_DEPTH, MAX_DEPTH
        )?;
        writeln!(
            out,
            "option name Heuristic type combo default {} var {}",
            Heuristic::default(),
            Heuristic::NAMES.join(" var ")
        )?;
        writeln!(
            out,
            "option name DistanceWeight type string default {}",
            weights.distance_weight
        )?;
        writeln!(
            out,
            "option name MobilityWeight type string default {}",
            weights.mobility_weight
        )?;
        writeln!(out, "option name Bias type string default {}", weights.bias)?;
        writeln!(out, "option name Parallel type check default false")?;
        writeln!(out, "option name MoveTime type spin default 0 min 0 max 60000")?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "iepok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles the `go` command: writes an `info` line and `bestmove`.
    ///
    /// A terminal position answers `bestmove none`. If the agent fails or
    /// runs out of time without an answer, a random legal move is played.
    pub fn handle_go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> io::Result<()> {
        let state = self.position;
        if state.terminal_test() {
            writeln!(out, "bestmove none")?;
            return out.flush();
        }

        let config = self.search_config(params);
        let decision = self.decide(state, config, params.movetime.or(self.movetime));

        if let Some(summary) = decision.summary {
            writeln!(
                out,
                "info depth {} nodes {} score {:.4} time {}",
                config.depth,
                summary.nodes,
                summary.score,
                decision.elapsed.as_millis()
            )?;
        }

        let action = match decision.action {
            Some(action) => Some(action),
            None => {
                log::warn!("go: agent produced no move, playing a random one");
                state.actions().choose(&mut self.rng).copied()
            }
        };
        match action.and_then(|a| format_action(&state, a)) {
            Some(cell) => writeln!(out, "bestmove {}", cell)?,
            None => writeln!(out, "bestmove none")?,
        }
        out.flush()
    }

    /// The stored config with any `go depth` override applied.
    fn search_config(&self, params: &GoParams) -> AgentConfig {
        let mut config = self.config;
        if let Some(depth) = params.depth {
            let candidate = AgentConfig { depth, ..config };
            match candidate.validate() {
                Ok(()) => config = candidate,
                Err(e) => log::warn!("go: {}", e),
            }
        }
        config
    }

    /// Runs the agent for the side to move. With a move time the answer is
    /// whatever the sink holds at the deadline; a search still running then
    /// is abandoned.
    fn decide(&mut self, state: Isolation, config: AgentConfig, movetime: Option<u64>) -> Decision {
        let player = state.player();
        let previous = self.context[player.index()].clone();
        let mut agent = MinimaxPlayer::new(player, config);
        Agent::<Isolation>::set_context(&mut agent, previous.clone());

        let (context, action, completed, elapsed) = match movetime {
            Some(ms) => {
                let boxed: Box<dyn Agent<Isolation>> = Box::new(agent);
                let (agent, turn) = run_until_deadline(boxed, state, Duration::from_millis(ms));
                if turn.timed_out {
                    log::warn!("go: no search result within {} ms", ms);
                }
                let action = match &turn.error {
                    Some(e) => {
                        log::warn!("go: {}", e);
                        None
                    }
                    None => turn.action,
                };
                let completed = !turn.timed_out && turn.error.is_none();
                let context = agent.and_then(|a| a.context().cloned());
                (context, action, completed, turn.elapsed)
            }
            None => {
                let start = Instant::now();
                let sink = ActionSink::new();
                let outcome = Agent::<Isolation>::get_action(&mut agent, &state, &sink);
                let (action, completed) = match outcome {
                    Ok(()) => (sink.take(), true),
                    Err(e) => {
                        log::warn!("go: {}", e);
                        (None, false)
                    }
                };
                let context = Agent::<Isolation>::context(&agent).cloned();
                (context, action, completed, start.elapsed())
            }
        };

        let summary = if completed && action.is_some() {
            context
                .clone()
                .and_then(|v| serde_json::from_value::<TurnSummary>(v).ok())
        } else {
            None
        };
        self.context[player.index()] = context.or(previous);
        Decision {
            action,
            summary,
            elapsed,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}
