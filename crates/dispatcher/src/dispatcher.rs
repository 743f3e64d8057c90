//! Dispatcher - registry plus one ordered dispatch cycle at a time

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use contracts::{DispatchError, DispatchToken, DispatcherConfig, TokenOperation};

use crate::callback::Callback;
use crate::cycle::{CallbackState, DispatchCycle};
use crate::metrics::DispatchMetrics;

type SharedCallback<P> = Rc<RefCell<dyn Callback<P>>>;

/// Broadcasts payloads to registered callbacks.
///
/// Callbacks run in registration order unless one of them calls
/// [`wait_for`](Self::wait_for), which runs the named callbacks first.
/// Only one dispatch may be in flight; the dispatcher is single-threaded and
/// every callback runs on the stack of the `dispatch` call.
///
/// No borrow of internal state is held while a callback runs, so callbacks may
/// call any method on the dispatcher they are handed.
pub struct Dispatcher<P> {
    config: DispatcherConfig,
    callbacks: RefCell<BTreeMap<DispatchToken, SharedCallback<P>>>,
    cycle: RefCell<Option<DispatchCycle<P>>>,
    metrics: Arc<DispatchMetrics>,
}

impl<P> Dispatcher<P> {
    /// Create a dispatcher with default settings
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a dispatcher with custom settings
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            config,
            callbacks: RefCell::new(BTreeMap::new()),
            cycle: RefCell::new(None),
            metrics: Arc::new(DispatchMetrics::new()),
        }
    }

    /// Dispatcher label
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Counters for this instance
    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Register a closure; returns its token
    pub fn register<F>(&self, callback: F) -> DispatchToken
    where
        F: FnMut(&Dispatcher<P>, &P) -> Result<(), DispatchError> + 'static,
    {
        self.register_callback(callback)
    }

    /// Register any [`Callback`] implementation; returns its token
    pub fn register_callback<C>(&self, callback: C) -> DispatchToken
    where
        C: Callback<P> + 'static,
    {
        let token = DispatchToken::mint();
        let shared: SharedCallback<P> = Rc::new(RefCell::new(callback));

        let size = {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks.insert(token, shared);
            callbacks.len()
        };

        debug!(dispatcher = %self.config.name, token = %token, "Callback registered");
        self.record_registry_size(size);
        token
    }

    /// Remove the callback bound to `token`
    ///
    /// # Errors
    /// - `UnknownToken` if the token is not registered
    /// - `CallbackBusy` if the callback is running in the current cycle
    pub fn unregister(&self, token: DispatchToken) -> Result<(), DispatchError> {
        if self.callback_state(token) == Some(CallbackState::Pending) {
            return Err(self.reject(DispatchError::CallbackBusy { token }));
        }

        let removed = {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks.remove(&token).map(|_| callbacks.len())
        };

        match removed {
            Some(size) => {
                debug!(dispatcher = %self.config.name, token = %token, "Callback unregistered");
                self.record_registry_size(size);
                Ok(())
            }
            None => Err(self.reject(DispatchError::unknown_token(
                token,
                TokenOperation::Unregister,
            ))),
        }
    }

    /// Whether a dispatch cycle is in flight
    pub fn is_dispatching(&self) -> bool {
        self.cycle.borrow().is_some()
    }

    /// Whether `token` maps to a registered callback
    pub fn is_registered(&self, token: DispatchToken) -> bool {
        self.callbacks.borrow().contains_key(&token)
    }

    /// Registered tokens, in registration order
    pub fn tokens(&self) -> Vec<DispatchToken> {
        self.callbacks.borrow().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }

    /// Progress of `token` in the current cycle, `None` when idle
    pub fn callback_state(&self, token: DispatchToken) -> Option<CallbackState> {
        self.cycle.borrow().as_ref().map(|cycle| cycle.state(token))
    }

    /// Run the callbacks for `tokens` before continuing the current one
    ///
    /// Tokens are processed in order. Callbacks already handled in this cycle
    /// are skipped; unstarted ones run to completion right away.
    ///
    /// # Errors
    /// - `NotDispatching` outside a dispatch cycle
    /// - `UnknownToken` for a token that is not registered
    /// - `CircularDependency` for a callback that started but has not finished
    /// - any error raised by a callback run on the way
    pub fn wait_for(&self, tokens: &[DispatchToken]) -> Result<(), DispatchError> {
        if !self.is_dispatching() {
            return Err(self.reject(DispatchError::NotDispatching));
        }

        for &token in tokens {
            if !self.is_registered(token) {
                return Err(self.reject(DispatchError::unknown_token(
                    token,
                    TokenOperation::WaitFor,
                )));
            }

            match self.callback_state(token) {
                Some(CallbackState::Handled) => {
                    trace!(dispatcher = %self.config.name, token = %token, "Dependency already handled");
                }
                Some(CallbackState::Pending) => {
                    return Err(self.reject(DispatchError::circular(token)));
                }
                Some(CallbackState::Unstarted) => {
                    trace!(dispatcher = %self.config.name, token = %token, "Resolving dependency");
                    self.invoke(token, true)?;
                }
                // reset() from inside a callback tore the cycle down
                None => return Err(self.reject(DispatchError::NotDispatching)),
            }
        }

        Ok(())
    }

    /// Broadcast `payload` to every registered callback
    ///
    /// Callbacks registered while the cycle runs are only reached through
    /// `wait_for`; callbacks unregistered while it runs are skipped. The cycle
    /// state is torn down on every exit path, including a panicking callback.
    ///
    /// # Errors
    /// - `AlreadyDispatching` if called while a cycle is in flight
    /// - the first error raised by a callback; the rest of the cycle is skipped
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, payload),
        fields(dispatcher = %self.config.name)
    )]
    pub fn dispatch(&self, payload: P) -> Result<(), DispatchError> {
        if self.is_dispatching() {
            return Err(self.reject(DispatchError::AlreadyDispatching));
        }

        let tokens = self.start_dispatching(payload);
        let guard = CycleGuard::new(self);
        let result = self.invoke_all(&tokens);
        let cycle = guard.finish();

        self.record_cycle(cycle.as_ref(), &result);
        result
    }

    /// Drop every callback and any cycle state
    ///
    /// Intended for test isolation, not for use around a live cycle.
    pub fn reset(&self) {
        if self.is_dispatching() {
            warn!(dispatcher = %self.config.name, "Reset while dispatching");
        }
        self.callbacks.borrow_mut().clear();
        self.cycle.borrow_mut().take();
        self.record_registry_size(0);
        debug!(dispatcher = %self.config.name, "Dispatcher reset");
    }

    fn start_dispatching(&self, payload: P) -> Vec<DispatchToken> {
        let tokens = self.tokens();
        *self.cycle.borrow_mut() = Some(DispatchCycle::new(payload, tokens.len()));
        trace!(dispatcher = %self.config.name, callbacks = tokens.len(), "Dispatch cycle started");
        tokens
    }

    fn stop_dispatching(&self) -> Option<DispatchCycle<P>> {
        self.cycle.borrow_mut().take()
    }

    fn invoke_all(&self, tokens: &[DispatchToken]) -> Result<(), DispatchError> {
        for &token in tokens {
            if self.callback_state(token) != Some(CallbackState::Unstarted) {
                continue;
            }
            if !self.is_registered(token) {
                trace!(dispatcher = %self.config.name, token = %token, "Skipping unregistered callback");
                continue;
            }
            self.invoke(token, false)?;
        }
        Ok(())
    }

    /// pending -> run -> handled
    fn invoke(&self, token: DispatchToken, deferred: bool) -> Result<(), DispatchError> {
        let callback = self
            .callbacks
            .borrow()
            .get(&token)
            .cloned()
            .ok_or_else(|| DispatchError::unknown_token(token, TokenOperation::WaitFor))?;

        let payload = self
            .cycle
            .borrow_mut()
            .as_mut()
            .map(|cycle| cycle.begin(token, deferred))
            .ok_or(DispatchError::NotDispatching)?;

        debug!(dispatcher = %self.config.name, token = %token, deferred, "Invoking callback");
        self.metrics.inc_callbacks_invoked(deferred);
        if self.config.record_metrics {
            observability::record_callback_invoked(&self.config.name, deferred);
        }

        {
            let mut callback = callback
                .try_borrow_mut()
                .map_err(|_| DispatchError::circular(token))?;
            callback.call(self, &payload)?;
        }

        if let Some(cycle) = self.cycle.borrow_mut().as_mut() {
            cycle.finish(token);
        }
        Ok(())
    }

    fn reject(&self, error: DispatchError) -> DispatchError {
        warn!(
            dispatcher = %self.config.name,
            code = error.code(),
            error = %error,
            "Dispatcher call rejected"
        );
        self.metrics.inc_rejected_calls();
        if self.config.record_metrics {
            observability::record_dispatch_error(&self.config.name, &error);
        }
        error
    }

    fn record_cycle(&self, cycle: Option<&DispatchCycle<P>>, result: &Result<(), DispatchError>) {
        let (invoked, deferred, duration_ms) = cycle
            .map(|c| (c.invoked(), c.deferred(), c.elapsed().as_secs_f64() * 1000.0))
            .unwrap_or_default();

        match result {
            Ok(()) => {
                self.metrics.inc_cycles_completed();
                debug!(
                    dispatcher = %self.config.name,
                    callbacks = invoked,
                    deferred,
                    duration_ms,
                    "Dispatch cycle completed"
                );
            }
            Err(e) => {
                self.metrics.inc_cycles_failed();
                warn!(
                    dispatcher = %self.config.name,
                    callbacks = invoked,
                    code = e.code(),
                    error = %e,
                    "Dispatch cycle aborted"
                );
                if self.config.record_metrics && matches!(e, DispatchError::Callback { .. }) {
                    observability::record_dispatch_error(&self.config.name, e);
                }
            }
        }

        if self.config.record_metrics {
            let outcome = if result.is_ok() { "ok" } else { "error" };
            observability::record_dispatch_cycle(&self.config.name, outcome, invoked, duration_ms);
        }
    }

    fn record_registry_size(&self, size: usize) {
        if self.config.record_metrics {
            observability::record_registry_size(&self.config.name, size);
        }
    }
}

impl<P> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.config.name)
            .field("callbacks", &self.len())
            .field("dispatching", &self.is_dispatching())
            .finish()
    }
}

/// Ends the cycle when dropped, so unwinding out of a callback still clears
/// the payload and the dispatching flag. `finish` disarms it.
struct CycleGuard<'a, P> {
    dispatcher: Option<&'a Dispatcher<P>>,
}

impl<'a, P> CycleGuard<'a, P> {
    fn new(dispatcher: &'a Dispatcher<P>) -> Self {
        Self {
            dispatcher: Some(dispatcher),
        }
    }

    fn finish(mut self) -> Option<DispatchCycle<P>> {
        self.dispatcher
            .take()
            .and_then(|dispatcher| dispatcher.stop_dispatching())
    }
}

impl<P> Drop for CycleGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.stop_dispatching();
        }
    }
}
