//! Single-slot result channel between an agent and its caller.
//!
//! The agent deposits actions with [`ActionSink::put`]; each deposit
//! replaces the previous one. The caller reads whatever is in the slot when
//! its time budget runs out. Clones share the same slot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared last-write-wins slot holding the agent's current answer.
#[derive(Debug)]
pub struct ActionSink<A> {
    slot: Arc<Mutex<Option<A>>>,
}

impl<A> Clone for ActionSink<A> {
    fn clone(&self) -> Self {
        ActionSink {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<A> Default for ActionSink<A> {
    fn default() -> Self {
        ActionSink {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<A: Copy> ActionSink<A> {
    /// Creates an empty sink.
    pub fn new() -> Self {
        ActionSink::default()
    }

    /// Deposits `action`, replacing any earlier answer.
    pub fn put(&self, action: A) {
        *self.lock() = Some(action);
    }

    /// The most recent deposit, left in place.
    pub fn latest(&self) -> Option<A> {
        *self.lock()
    }

    /// Removes and returns the most recent deposit.
    pub fn take(&self) -> Option<A> {
        self.lock().take()
    }

    // A writer that panicked mid-deposit cannot leave a torn `Option<A>`
    // behind, so a poisoned slot is still readable.
    fn lock(&self) -> MutexGuard<'_, Option<A>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
