//! Single critical section around the live state.
//!
//! The history buffer and the command store are only reachable through
//! `Guard::with`, so a reader never sees a buffer mid-append or a
//! half-written command record, and every snapshot is taken under one lock.

use crate::command::CommandStore;
use crate::history::HistoryBuffer;
use std::sync::{Mutex, PoisonError};

/// Mutable state shared by all requests.
#[derive(Debug)]
pub(crate) struct LiveState {
    pub(crate) history: HistoryBuffer,
    pub(crate) commands: CommandStore,
}

#[derive(Debug)]
pub(crate) struct Guard {
    state: Mutex<LiveState>,
}

impl Guard {
    pub(crate) fn new(state: LiveState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Run `f` with exclusive access to the live state.
    ///
    /// A poisoned lock is recovered: mutations under the guard are single
    /// pushes or assignments, so the state is whole even if a holder panicked.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut LiveState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}
