//! Scenario store - a configured callback

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use contracts::{Action, DispatchError, DispatchToken, StoreConfig};
use dispatcher::{Callback, Dispatcher};
use tracing::debug;

/// Store name -> token, filled in as stores are registered
pub(crate) type TokenDirectory = Rc<RefCell<HashMap<String, DispatchToken>>>;

/// Names of stores in the order they finished handling the current action
pub(crate) type HandledLog = Rc<RefCell<Vec<String>>>;

/// Callback built from a `StoreConfig`.
///
/// For every action kind it handles, it waits for its declared dependencies,
/// then either fails (kinds listed in `fail_on`) or records itself as handled.
pub(crate) struct ScenarioStore {
    config: StoreConfig,
    directory: TokenDirectory,
    handled: HandledLog,
}

impl ScenarioStore {
    pub(crate) fn new(config: StoreConfig, directory: TokenDirectory, handled: HandledLog) -> Self {
        Self {
            config,
            directory,
            handled,
        }
    }

    fn dependency_tokens(&self) -> Vec<DispatchToken> {
        let directory = self.directory.borrow();
        self.config
            .wait_for
            .iter()
            .filter_map(|name| directory.get(name).copied())
            .collect()
    }
}

impl Callback<Action> for ScenarioStore {
    fn call(
        &mut self,
        dispatcher: &Dispatcher<Action>,
        action: &Action,
    ) -> Result<(), DispatchError> {
        if !self.config.handles_kind(&action.kind) {
            return Ok(());
        }

        let deps = self.dependency_tokens();
        if !deps.is_empty() {
            debug!(store = %self.config.name, deps = ?self.config.wait_for, "Waiting for stores");
            dispatcher.wait_for(&deps)?;
        }

        if self.config.fails_on(&action.kind) {
            return Err(DispatchError::callback(format!(
                "store '{}' failed on '{}'",
                self.config.name, action.kind
            )));
        }

        debug!(store = %self.config.name, kind = %action.kind, "Store handled action");
        self.handled.borrow_mut().push(self.config.name.clone());
        Ok(())
    }
}
