//! Scenario runner - composition root for one dispatcher.

use std::rc::Rc;
use std::time::Instant;

use contracts::{Action, ScenarioBlueprint};
use dispatcher::Dispatcher;
use observability::DispatchStatsAggregator;
use tracing::{info, warn};

use super::report::{ActionReport, RunReport};
use super::store::{HandledLog, ScenarioStore, TokenDirectory};
use crate::error::CliError;

/// Builds a dispatcher from a blueprint and dispatches its actions
pub struct ScenarioRunner {
    blueprint: ScenarioBlueprint,
    stop_on_error: bool,
}

impl ScenarioRunner {
    pub fn new(blueprint: ScenarioBlueprint) -> Self {
        Self {
            blueprint,
            stop_on_error: false,
        }
    }

    /// Stop at the first failing dispatch instead of carrying on
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    /// Register every store, then dispatch every action in order
    pub fn run(self) -> RunReport {
        let dispatcher: Dispatcher<Action> =
            Dispatcher::with_config(self.blueprint.dispatcher.clone());
        let directory = TokenDirectory::default();
        let handled = HandledLog::default();

        for store in &self.blueprint.stores {
            let token = dispatcher.register_callback(ScenarioStore::new(
                store.clone(),
                Rc::clone(&directory),
                Rc::clone(&handled),
            ));
            directory.borrow_mut().insert(store.name.clone(), token);
        }

        info!(
            dispatcher = %dispatcher.name(),
            stores = dispatcher.len(),
            actions = self.blueprint.actions.len(),
            "Stores registered"
        );

        let mut stats = DispatchStatsAggregator::new();
        let mut actions = Vec::with_capacity(self.blueprint.actions.len());
        let mut abort = None;

        for (index, action) in self.blueprint.actions.iter().enumerate() {
            let before = dispatcher.metrics().snapshot();
            let started = Instant::now();
            let result = dispatcher.dispatch(action.clone());
            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
            let after = dispatcher.metrics().snapshot();

            let handled_by = std::mem::take(&mut *handled.borrow_mut());
            let mut report = ActionReport {
                index,
                kind: action.kind.clone(),
                handled_by,
                code: None,
                error: None,
            };

            match result {
                Ok(()) => stats.record_success(
                    after.callbacks_invoked - before.callbacks_invoked,
                    after.deferred_invocations - before.deferred_invocations,
                    duration_ms,
                ),
                Err(e) => {
                    warn!(index, kind = %action.kind, code = e.code(), error = %e, "Dispatch failed");
                    stats.record_failure(&e, duration_ms);
                    report.code = Some(e.code());
                    report.error = Some(e.to_string());
                    if self.stop_on_error {
                        actions.push(report);
                        abort = Some(CliError::dispatch_failed(index, &action.kind, e));
                        break;
                    }
                }
            }
            actions.push(report);
        }

        RunReport {
            dispatcher: dispatcher.name().to_string(),
            store_count: dispatcher.len(),
            actions,
            stats,
            metrics: dispatcher.metrics().snapshot(),
            abort,
        }
    }
}
