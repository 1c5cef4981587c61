//! Running one agent turn under a wall-clock budget.
//!
//! The agent runs on a worker thread and writes into a fresh sink. When the
//! budget expires the sink is read at once; that snapshot is the turn's
//! answer even if the agent deposits something later, fails, or panics.
//! [`run_turn`] then joins the worker so the agent can be reused next turn;
//! [`run_until_deadline`] returns at the deadline and leaves the worker
//! running on its own.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::agent::{Agent, AgentError};
use crate::game::GameState;
use crate::sink::ActionSink;

/// The outcome of a supervised turn.
#[derive(Debug)]
pub struct Turn<A> {
    /// The answer in the sink at the deadline, or at completion if sooner.
    pub action: Option<A>,
    /// True if the agent was still running at the deadline.
    pub timed_out: bool,
    /// The agent's own error, or [`AgentError::Panicked`].
    pub error: Option<AgentError>,
    /// Time until the answer was read.
    pub elapsed: Duration,
}

type Outcome<S> = (Box<dyn Agent<S>>, Result<(), AgentError>);

/// How waiting on a worker ended.
enum Waited<S: GameState> {
    /// The agent finished in time; `None` if it panicked.
    Done(Option<Outcome<S>>),
    /// The budget expired; holds the sink snapshot.
    Expired(Option<S::Action>),
}

/// A running agent and the channels to collect it.
struct Worker<S: GameState> {
    sink: ActionSink<S::Action>,
    rx: Receiver<Outcome<S>>,
    handle: JoinHandle<()>,
    start: Instant,
}

impl<S> Worker<S>
where
    S: GameState + Send + 'static,
    S::Action: Send + 'static,
{
    fn spawn(agent: Box<dyn Agent<S>>, state: S) -> Self {
        let sink = ActionSink::new();
        let worker_sink = sink.clone();
        let (tx, rx) = mpsc::channel();
        let start = Instant::now();

        let handle = thread::spawn(move || {
            let mut agent = agent;
            let outcome = agent.get_action(&state, &worker_sink);
            // The receiver is gone once the supervisor stops waiting.
            let _ = tx.send((agent, outcome));
        });

        Worker {
            sink,
            rx,
            handle,
            start,
        }
    }

    fn wait(&self, limit: Duration) -> Waited<S> {
        match self.rx.recv_timeout(limit) {
            Ok(outcome) => Waited::Done(Some(outcome)),
            Err(RecvTimeoutError::Disconnected) => Waited::Done(None),
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("turn budget of {:?} expired", limit);
                Waited::Expired(self.sink.latest())
            }
        }
    }

    fn finish(
        self,
        outcome: Option<Outcome<S>>,
        action: Option<S::Action>,
        timed_out: bool,
        elapsed: Duration,
    ) -> (Option<Box<dyn Agent<S>>>, Turn<S::Action>) {
        let _ = self.handle.join();
        let (agent, error) = match outcome {
            Some((agent, result)) => (Some(agent), result.err()),
            None => (None, Some(AgentError::Panicked)),
        };
        let turn = Turn {
            action,
            timed_out,
            error,
            elapsed,
        };
        (agent, turn)
    }
}

/// Runs `agent` on `state` with a time budget of `limit`.
///
/// Returns the agent together with the turn outcome. Blocks past the
/// deadline only to recover the agent; the answer is fixed at the deadline.
/// The agent is `None` if it panicked.
pub fn run_turn<S>(
    agent: Box<dyn Agent<S>>,
    state: S,
    limit: Duration,
) -> (Option<Box<dyn Agent<S>>>, Turn<S::Action>)
where
    S: GameState + Send + 'static,
    S::Action: Send + 'static,
{
    let worker = Worker::spawn(agent, state);
    match worker.wait(limit) {
        Waited::Done(outcome) => {
            let action = worker.sink.latest();
            let elapsed = worker.start.elapsed();
            worker.finish(outcome, action, false, elapsed)
        }
        Waited::Expired(action) => {
            let elapsed = worker.start.elapsed();
            let outcome = worker.rx.recv().ok();
            worker.finish(outcome, action, true, elapsed)
        }
    }
}

/// Like [`run_turn`], but returns as soon as the budget expires.
///
/// A timed-out agent keeps running detached and is not returned; whatever
/// it deposits after the deadline is dropped with it.
pub fn run_until_deadline<S>(
    agent: Box<dyn Agent<S>>,
    state: S,
    limit: Duration,
) -> (Option<Box<dyn Agent<S>>>, Turn<S::Action>)
where
    S: GameState + Send + 'static,
    S::Action: Send + 'static,
{
    let worker = Worker::spawn(agent, state);
    match worker.wait(limit) {
        Waited::Done(outcome) => {
            let action = worker.sink.latest();
            let elapsed = worker.start.elapsed();
            worker.finish(outcome, action, false, elapsed)
        }
        Waited::Expired(action) => {
            let turn = Turn {
                action,
                timed_out: true,
                error: None,
                elapsed: worker.start.elapsed(),
            };
            (None, turn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{MinimaxPlayer, RandomPlayer};
    use crate::board::{Action, Isolation, Position};
    use crate::config::AgentConfig;
    use crate::game::PlayerId;

    /// Deposits a first answer, then sleeps past any short budget and
    /// deposits a second one.
    struct SlowAgent {
        first: Action,
        second: Action,
        nap: Duration,
    }

    impl Agent<Isolation> for SlowAgent {
        fn name(&self) -> &str {
            "slow"
        }

        fn player_id(&self) -> PlayerId {
            PlayerId::FIRST
        }

        fn get_action(
            &mut self,
            _state: &Isolation,
            sink: &ActionSink<Action>,
        ) -> Result<(), AgentError> {
            sink.put(self.first);
            thread::sleep(self.nap);
            sink.put(self.second);
            Ok(())
        }
    }

    struct SilentAgent;

    impl Agent<Isolation> for SilentAgent {
        fn name(&self) -> &str {
            "silent"
        }

        fn player_id(&self) -> PlayerId {
            PlayerId::FIRST
        }

        fn get_action(&mut self, _: &Isolation, _: &ActionSink<Action>) -> Result<(), AgentError> {
            thread::sleep(Duration::from_millis(100));
            Ok(())
        }
    }

    struct PanickingAgent;

    impl Agent<Isolation> for PanickingAgent {
        fn name(&self) -> &str {
            "panicking"
        }

        fn player_id(&self) -> PlayerId {
            PlayerId::FIRST
        }

        fn get_action(&mut self, _: &Isolation, _: &ActionSink<Action>) -> Result<(), AgentError> {
            panic!("boom");
        }
    }

    /// Deposits an answer, then panics after sleeping past the budget.
    struct LatePanicAgent;

    impl Agent<Isolation> for LatePanicAgent {
        fn name(&self) -> &str {
            "late panic"
        }

        fn player_id(&self) -> PlayerId {
            PlayerId::FIRST
        }

        fn get_action(
            &mut self,
            _state: &Isolation,
            sink: &ActionSink<Action>,
        ) -> Result<(), AgentError> {
            sink.put(place(0, 0));
            thread::sleep(Duration::from_millis(100));
            panic!("late boom");
        }
    }

    fn place(x: usize, y: usize) -> Action {
        Action::Place(Position::from_xy(x, y).unwrap())
    }

    fn slow_agent(nap: Duration) -> Box<dyn Agent<Isolation>> {
        Box::new(SlowAgent {
            first: place(0, 0),
            second: place(1, 0),
            nap,
        })
    }

    #[test]
    fn fast_agent_completes_in_time() {
        let config = AgentConfig {
            depth: 1,
            ..AgentConfig::default()
        };
        let agent: Box<dyn Agent<Isolation>> =
            Box::new(MinimaxPlayer::new(PlayerId::FIRST, config));
        let state = Isolation::new();
        let (agent, turn) = run_turn(agent, state, Duration::from_secs(30));
        assert!(!turn.timed_out);
        assert!(turn.error.is_none());
        assert!(state.actions().contains(&turn.action.unwrap()));
        let agent = agent.unwrap();
        assert_eq!(agent.name(), "minimax");
        assert!(agent.context().is_some());
    }

    #[test]
    fn deadline_keeps_answer_deposited_before_cutoff() {
        let (agent, turn) = run_turn(
            slow_agent(Duration::from_millis(300)),
            Isolation::new(),
            Duration::from_millis(50),
        );
        assert!(turn.timed_out);
        assert!(turn.error.is_none());
        assert_eq!(turn.action, Some(place(0, 0)));
        assert_eq!(agent.unwrap().name(), "slow");
    }

    #[test]
    fn panic_after_deadline_keeps_snapshot() {
        let agent: Box<dyn Agent<Isolation>> = Box::new(LatePanicAgent);
        let (agent, turn) = run_turn(agent, Isolation::new(), Duration::from_millis(10));
        assert!(agent.is_none());
        assert!(turn.timed_out);
        assert_eq!(turn.action, Some(place(0, 0)));
        assert!(matches!(turn.error, Some(AgentError::Panicked)));
    }

    #[test]
    fn silent_agent_times_out_empty() {
        let agent: Box<dyn Agent<Isolation>> = Box::new(SilentAgent);
        let (_, turn) = run_turn(agent, Isolation::new(), Duration::from_millis(10));
        assert!(turn.timed_out);
        assert_eq!(turn.action, None);
    }

    #[test]
    fn agent_error_is_reported() {
        // Second player's agent asked to open the game.
        let agent: Box<dyn Agent<Isolation>> =
            Box::new(RandomPlayer::new(PlayerId::SECOND, Some(3)));
        let (agent, turn) = run_turn(agent, Isolation::new(), Duration::from_secs(5));
        assert!(agent.is_some());
        assert!(!turn.timed_out);
        assert!(turn.action.is_none());
        assert!(matches!(turn.error, Some(AgentError::NotOnTurn { .. })));
    }

    #[test]
    fn panicking_agent_is_an_error() {
        let agent: Box<dyn Agent<Isolation>> = Box::new(PanickingAgent);
        let (agent, turn) = run_turn(agent, Isolation::new(), Duration::from_secs(5));
        assert!(agent.is_none());
        assert!(!turn.timed_out);
        assert!(matches!(turn.error, Some(AgentError::Panicked)));
    }

    #[test]
    fn until_deadline_returns_without_waiting() {
        let start = Instant::now();
        let (agent, turn) = run_until_deadline(
            slow_agent(Duration::from_secs(2)),
            Isolation::new(),
            Duration::from_millis(20),
        );
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(agent.is_none());
        assert!(turn.timed_out);
        assert_eq!(turn.action, Some(place(0, 0)));
    }

    #[test]
    fn until_deadline_returns_agent_that_finished() {
        let (agent, turn) = run_until_deadline(
            slow_agent(Duration::from_millis(1)),
            Isolation::new(),
            Duration::from_secs(5),
        );
        assert!(!turn.timed_out);
        assert_eq!(turn.action, Some(place(1, 0)));
        assert_eq!(agent.unwrap().name(), "slow");
    }
}
