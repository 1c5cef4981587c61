//! Fixed-depth minimax.
//!
//! The searching player maximizes, the opponent minimizes, and depth drops by
//! one per ply whichever side moves. There is no pruning, ordering or
//! transposition table: a uniform tree of branching `b` costs exactly `b^d`
//! leaf scorings. The search never looks at the clock.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::eval::Evaluator;
use crate::game::{GameState, PlayerId};

/// Reasons a decision cannot be made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search started from a terminal state")]
    TerminalRoot,

    #[error("search depth must be at least 1")]
    ZeroDepth,

    #[error("non-terminal state has no legal actions ({depth} plies left)")]
    NoLegalActions { depth: u32 },
}

/// Counters collected while searching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States visited, root included.
    pub nodes: u64,
    /// Evaluator calls at the depth cutoff.
    pub evaluations: u64,
    /// Terminal states scored by utility.
    pub terminals: u64,
}

impl SearchStats {
    fn merge(&mut self, other: SearchStats) {
        self.nodes += other.nodes;
        self.evaluations += other.evaluations;
        self.terminals += other.terminals;
    }
}

/// Result of a search: the chosen root action and associated info.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    pub action: A,
    pub score: f64,
    pub depth: u32,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

impl<A> SearchResult<A> {
    /// Formats the result as a protocol `info` line.
    pub fn info_line(&self) -> String {
        format!(
            "info depth {} nodes {} score {:.4} time {}",
            self.depth,
            self.stats.nodes,
            self.score,
            self.elapsed.as_millis()
        )
    }
}

/// Chooses the root action with the best minimax value for `player`.
///
/// Ties go to the first action in the state's enumeration order. Fails if
/// `state` is terminal or `depth` is zero.
pub fn minimax_decision<S, E>(
    state: &S,
    depth: u32,
    player: PlayerId,
    evaluator: &E,
) -> Result<SearchResult<S::Action>, SearchError>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    let start = Instant::now();
    let actions = root_actions(state, depth)?;
    let mut stats = SearchStats {
        nodes: 1,
        ..SearchStats::default()
    };

    let mut scored = Vec::with_capacity(actions.len());
    for action in actions {
        let value = min_value(&state.result(action), depth - 1, player, evaluator, &mut stats)?;
        scored.push((action, value));
    }

    finish(scored, depth, stats, start)
}

/// Same decision as [`minimax_decision`], with root children searched in
/// parallel. Tie-breaking and the returned value are identical.
pub fn par_minimax_decision<S, E>(
    state: &S,
    depth: u32,
    player: PlayerId,
    evaluator: &E,
) -> Result<SearchResult<S::Action>, SearchError>
where
    S: GameState + Send + Sync,
    S::Action: Send + Sync,
    E: Evaluator<S> + Sync + ?Sized,
{
    let start = Instant::now();
    let actions = root_actions(state, depth)?;

    let branches: Vec<(S::Action, f64, SearchStats)> = actions
        .par_iter()
        .map(|&action| {
            let mut branch = SearchStats::default();
            min_value(&state.result(action), depth - 1, player, evaluator, &mut branch)
                .map(|value| (action, value, branch))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = SearchStats {
        nodes: 1,
        ..SearchStats::default()
    };
    let mut scored = Vec::with_capacity(branches.len());
    for (action, value, branch) in branches {
        stats.merge(branch);
        scored.push((action, value));
    }

    finish(scored, depth, stats, start)
}

/// Value of a node where the opponent of `player` is to choose.
pub fn min_value<S, E>(
    state: &S,
    depth: u32,
    player: PlayerId,
    evaluator: &E,
    stats: &mut SearchStats,
) -> Result<f64, SearchError>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    if let Some(value) = leaf_value(state, depth, player, evaluator, stats) {
        return Ok(value);
    }
    let actions = state.actions();
    if actions.is_empty() {
        return Err(SearchError::NoLegalActions { depth });
    }
    let mut value = f64::INFINITY;
    for action in actions {
        value = value.min(max_value(&state.result(action), depth - 1, player, evaluator, stats)?);
    }
    Ok(value)
}

/// Value of a node where `player` is to choose.
pub fn max_value<S, E>(
    state: &S,
    depth: u32,
    player: PlayerId,
    evaluator: &E,
    stats: &mut SearchStats,
) -> Result<f64, SearchError>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    if let Some(value) = leaf_value(state, depth, player, evaluator, stats) {
        return Ok(value);
    }
    let actions = state.actions();
    if actions.is_empty() {
        return Err(SearchError::NoLegalActions { depth });
    }
    let mut value = f64::NEG_INFINITY;
    for action in actions {
        value = value.max(min_value(&state.result(action), depth - 1, player, evaluator, stats)?);
    }
    Ok(value)
}

/// Scores terminal states by utility and cut-off states by the evaluator.
/// Returns `None` when the node must be expanded.
#[inline]
fn leaf_value<S, E>(
    state: &S,
    depth: u32,
    player: PlayerId,
    evaluator: &E,
    stats: &mut SearchStats,
) -> Option<f64>
where
    S: GameState,
    E: Evaluator<S> + ?Sized,
{
    stats.nodes += 1;
    if state.terminal_test() {
        stats.terminals += 1;
        return Some(state.utility(player));
    }
    if depth == 0 {
        stats.evaluations += 1;
        return Some(evaluator.evaluate(state, player));
    }
    None
}

fn root_actions<S: GameState>(state: &S, depth: u32) -> Result<Vec<S::Action>, SearchError> {
    if depth == 0 {
        return Err(SearchError::ZeroDepth);
    }
    if state.terminal_test() {
        return Err(SearchError::TerminalRoot);
    }
    let actions = state.actions();
    if actions.is_empty() {
        return Err(SearchError::NoLegalActions { depth });
    }
    Ok(actions)
}

/// Picks the first action with the strictly greatest value.
fn finish<A: Copy>(
    scored: Vec<(A, f64)>,
    depth: u32,
    stats: SearchStats,
    start: Instant,
) -> Result<SearchResult<A>, SearchError> {
    let mut best: Option<(A, f64)> = None;
    for (action, value) in scored {
        match best {
            Some((_, best_value)) if !(value > best_value) => {}
            _ => best = Some((action, value)),
        }
    }
    let (action, score) = best.ok_or(SearchError::NoLegalActions { depth })?;
    let result = SearchResult {
        action,
        score,
        depth,
        stats,
        elapsed: start.elapsed(),
    };
    log::debug!("{}", result.info_line());
    Ok(result)
}
