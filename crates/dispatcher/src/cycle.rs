//! Per-cycle bookkeeping

use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use contracts::DispatchToken;

/// Progress of one callback within the current dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackState {
    /// Not invoked yet in this cycle
    Unstarted,
    /// Invocation started, not yet returned
    Pending,
    /// Invocation returned normally
    Handled,
}

/// State of the in-flight dispatch. Dropped when the cycle ends.
pub(crate) struct DispatchCycle<P> {
    payload: Rc<P>,
    states: HashMap<DispatchToken, CallbackState>,
    invoked: u64,
    deferred: u64,
    started_at: Instant,
}

impl<P> DispatchCycle<P> {
    pub(crate) fn new(payload: P, capacity: usize) -> Self {
        Self {
            payload: Rc::new(payload),
            states: HashMap::with_capacity(capacity),
            invoked: 0,
            deferred: 0,
            started_at: Instant::now(),
        }
    }

    pub(crate) fn state(&self, token: DispatchToken) -> CallbackState {
        self.states
            .get(&token)
            .copied()
            .unwrap_or(CallbackState::Unstarted)
    }

    /// Mark `token` pending and hand out the payload for its invocation.
    pub(crate) fn begin(&mut self, token: DispatchToken, deferred: bool) -> Rc<P> {
        self.states.insert(token, CallbackState::Pending);
        self.invoked += 1;
        if deferred {
            self.deferred += 1;
        }
        Rc::clone(&self.payload)
    }

    pub(crate) fn finish(&mut self, token: DispatchToken) {
        self.states.insert(token, CallbackState::Handled);
    }

    pub(crate) fn invoked(&self) -> u64 {
        self.invoked
    }

    pub(crate) fn deferred(&self) -> u64 {
        self.deferred
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
