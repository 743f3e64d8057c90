//! # Integration Tests
//!
//! Cross-crate tests.
//!
//! Covers:
//! - Contract snapshots (tokens, error codes)
//! - Dispatcher protocol: ordering, `wait_for`, reentrancy, cleanup
//! - Scenario files driving a dispatcher end to end

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchError, DispatchToken, TokenOperation};

    #[test]
    fn test_token_format() {
        let token = DispatchToken::mint();
        assert_eq!(token.to_string(), format!("ID_{}", token.as_u64()));
    }

    #[test]
    fn test_error_codes_are_stable() {
        let token = DispatchToken::mint();
        let codes = [
            DispatchError::unknown_token(token, TokenOperation::Unregister).code(),
            DispatchError::unknown_token(token, TokenOperation::WaitFor).code(),
            DispatchError::NotDispatching.code(),
            DispatchError::circular(token).code(),
            DispatchError::AlreadyDispatching.code(),
        ];
        assert_eq!(
            codes,
            [
                "dispatcher-unregister-not-map",
                "dispatcher-waitfor-invalid-token",
                "dispatcher-waitfor-invoked-outside-dispatch",
                "dispatcher-waitfor-circular-dependency",
                "dispatcher-cant-dispatch-while-dispatching",
            ]
        );
    }
}

#[cfg(test)]
mod dispatcher_tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::rc::Rc;

    use contracts::{DispatchError, DispatchToken, DispatcherConfig};
    use dispatcher::Dispatcher;

    type Log = Rc<RefCell<Vec<String>>>;
    type Slot = Rc<Cell<Option<DispatchToken>>>;

    fn dispatcher<P>() -> Dispatcher<P> {
        Dispatcher::with_config(DispatcherConfig {
            name: "integration".into(),
            record_metrics: false,
        })
    }

    /// Callback that waits for the token in `dep` (if set), then logs `name`
    fn store<P: 'static>(
        log: &Log,
        name: &str,
        dep: &Slot,
    ) -> impl FnMut(&Dispatcher<P>, &P) -> Result<(), DispatchError> + 'static {
        let log = Rc::clone(log);
        let dep = Rc::clone(dep);
        let name = name.to_string();
        move |d, _| {
            if let Some(token) = dep.get() {
                d.wait_for(&[token])?;
            }
            log.borrow_mut().push(name.clone());
            Ok(())
        }
    }

    #[test]
    fn test_tokens_are_distinct() {
        let d = dispatcher::<()>();
        let tokens: HashSet<_> = (0..50).map(|_| d.register(|_, _| Ok(()))).collect();
        assert_eq!(tokens.len(), 50);

        let other = dispatcher::<()>();
        let foreign = other.register(|_, _| Ok(()));
        assert!(!tokens.contains(&foreign));
    }

    #[test]
    fn test_unregistered_token_is_unknown() {
        let d = dispatcher::<()>();
        let token = d.register(|_, _| Ok(()));
        d.unregister(token).unwrap();

        let err = d.unregister(token).unwrap_err();
        assert_eq!(err.code(), "dispatcher-unregister-not-map");
        assert_eq!(err.token(), Some(token));
    }

    #[test]
    fn test_dispatch_with_no_callbacks() {
        let d = dispatcher::<&str>();
        d.dispatch("nothing").unwrap();
        assert!(!d.is_dispatching());
        assert_eq!(d.metrics().cycles_completed(), 1);
    }

    #[test]
    fn test_wait_for_reorders_callbacks() {
        let d = dispatcher::<u8>();
        let log = Log::default();
        let none = Slot::default();
        let a_dep = Slot::default();

        d.register(store(&log, "A", &a_dep));
        d.register(store(&log, "B", &none));
        a_dep.set(Some(d.register(store(&log, "C", &none))));

        d.dispatch(1).unwrap();
        assert_eq!(*log.borrow(), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_every_callback_runs_once_per_dispatch() {
        let d = dispatcher::<u8>();
        let log = Log::default();
        let none = Slot::default();
        let dep = Slot::default();

        let first = d.register(store(&log, "first", &none));
        dep.set(Some(first));
        d.register(store(&log, "second", &dep));
        d.register(store(&log, "third", &dep));

        d.dispatch(1).unwrap();
        d.dispatch(2).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["first", "second", "third", "first", "second", "third"]
        );
    }

    #[test]
    fn test_mutual_wait_is_circular() {
        let d = dispatcher::<u8>();
        let log = Log::default();
        let a_dep = Slot::default();
        let b_dep = Slot::default();

        let a = d.register(store(&log, "A", &a_dep));
        let b = d.register(store(&log, "B", &b_dep));
        a_dep.set(Some(b));
        b_dep.set(Some(a));

        let err = d.dispatch(1).unwrap_err();
        assert!(matches!(err, DispatchError::CircularDependency { token } if token == a));
        assert!(log.borrow().is_empty());
        assert!(!d.is_dispatching());
    }

    #[test]
    fn test_wait_for_outside_dispatch() {
        let d = dispatcher::<u8>();
        let token = d.register(|_, _| Ok(()));
        assert!(matches!(
            d.wait_for(&[token]),
            Err(DispatchError::NotDispatching)
        ));
    }

    #[test]
    fn test_nested_dispatch_rejected_outer_continues() {
        let d = dispatcher::<u8>();
        let log = Log::default();
        let none = Slot::default();

        let inner_log = Rc::clone(&log);
        d.register(move |d: &Dispatcher<u8>, payload: &u8| {
            let nested = d.dispatch(payload + 1);
            inner_log.borrow_mut().push(format!(
                "nested: {}",
                nested.err().map(|e| e.code()).unwrap_or("ok")
            ));
            Ok(())
        });
        d.register(store(&log, "after", &none));

        d.dispatch(1).unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["nested: dispatcher-cant-dispatch-while-dispatching", "after"]
        );
    }

    #[test]
    fn test_cleanup_after_failed_cycle() {
        let d = dispatcher::<u8>();
        let fail = Rc::new(Cell::new(true));
        let flag = Rc::clone(&fail);
        d.register(move |_: &Dispatcher<u8>, _: &u8| {
            if flag.get() {
                Err(DispatchError::callback("store rejected payload"))
            } else {
                Ok(())
            }
        });

        assert!(d.dispatch(1).is_err());
        assert!(!d.is_dispatching());

        fail.set(false);
        d.dispatch(2).unwrap();
        assert_eq!(d.metrics().cycles_failed(), 1);
        assert_eq!(d.metrics().cycles_completed(), 1);
    }

    #[test]
    fn test_dispatching_flag_inside_callback() {
        let d = dispatcher::<u8>();
        let seen = Rc::new(Cell::new(false));
        let flag = Rc::clone(&seen);
        d.register(move |d: &Dispatcher<u8>, _: &u8| {
            flag.set(d.is_dispatching());
            Ok(())
        });

        assert!(!d.is_dispatching());
        d.dispatch(0).unwrap();
        assert!(seen.get());
        assert!(!d.is_dispatching());
    }

    #[test]
    fn test_reset_between_tests() {
        let d = dispatcher::<u8>();
        let token = d.register(|_, _| Ok(()));
        d.reset();

        assert!(d.is_empty());
        assert!(d.unregister(token).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Action, DispatchError, DispatchToken, StoreConfig};
    use dispatcher::Dispatcher;
    use observability::DispatchStatsAggregator;

    const SCENARIO: &str = r#"
[dispatcher]
name = "todo-app"
record_metrics = false

[[stores]]
name = "view"
wait_for = ["todo"]

[[stores]]
name = "todo"
handles = ["todo/create"]

[[actions]]
kind = "todo/create"
data = { text = "buy milk" }

[[actions]]
kind = "todo/create"
data = { text = "walk dog" }

[[actions]]
kind = "app/refresh"
"#;

    type Log = Rc<RefCell<Vec<String>>>;

    /// One callback per configured store: waits for its dependencies, records
    /// todo texts and the order stores finished in
    fn register_stores(
        dispatcher: &Dispatcher<Action>,
        stores: &[StoreConfig],
        todos: &Log,
        order: &Log,
    ) -> HashMap<String, DispatchToken> {
        let directory: Rc<RefCell<HashMap<String, DispatchToken>>> = Rc::default();

        for store in stores.iter().cloned() {
            let dir = Rc::clone(&directory);
            let todos = Rc::clone(todos);
            let order = Rc::clone(order);
            let name = store.name.clone();

            let token = dispatcher.register(move |d: &Dispatcher<Action>, action: &Action| {
                if !store.handles_kind(&action.kind) {
                    return Ok::<(), DispatchError>(());
                }
                let deps: Vec<DispatchToken> = store
                    .wait_for
                    .iter()
                    .filter_map(|dep| dir.borrow().get(dep).copied())
                    .collect();
                d.wait_for(&deps)?;

                if store.name == "todo" {
                    if let Some(text) = action.data.get("text").and_then(|t| t.as_str()) {
                        todos.borrow_mut().push(text.to_string());
                    }
                }
                order.borrow_mut().push(store.name.clone());
                Ok(())
            });
            directory.borrow_mut().insert(name, token);
        }

        let tokens = directory.borrow().clone();
        tokens
    }

    /// Scenario file -> blueprint -> one dispatcher with a callback per store
    #[test]
    fn test_scenario_drives_dispatcher() {
        let blueprint = ConfigLoader::load_from_str(SCENARIO, ConfigFormat::Toml).unwrap();
        let dispatcher: Dispatcher<Action> =
            Dispatcher::with_config(blueprint.dispatcher.clone());

        let todos = Log::default();
        let order = Log::default();
        register_stores(&dispatcher, &blueprint.stores, &todos, &order);

        let mut stats = DispatchStatsAggregator::new();
        for action in &blueprint.actions {
            dispatcher.dispatch(action.clone()).unwrap();
            stats.record_success(0, 0, 0.0);
        }

        assert_eq!(*todos.borrow(), vec!["buy milk", "walk dog"]);
        assert_eq!(
            *order.borrow(),
            vec!["todo", "view", "todo", "view", "view"]
        );

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.cycles_completed, 3);
        assert_eq!(snapshot.deferred_invocations, 3);
        assert_eq!(stats.total_cycles(), 3);
    }

    #[test]
    fn test_static_cycle_matches_runtime_error() {
        let content = r#"
[dispatcher]
record_metrics = false

[[stores]]
name = "a"
wait_for = ["b"]

[[stores]]
name = "b"
wait_for = ["a"]
"#;
        let blueprint = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let cycle = config_loader::find_dependency_cycle(&blueprint).unwrap();
        assert_eq!(cycle, vec!["a", "b", "a"]);

        let dispatcher: Dispatcher<Action> =
            Dispatcher::with_config(blueprint.dispatcher.clone());
        let todos = Log::default();
        let order = Log::default();
        let tokens = register_stores(&dispatcher, &blueprint.stores, &todos, &order);

        let err = dispatcher.dispatch(Action::new("ping")).unwrap_err();
        assert!(matches!(err, DispatchError::CircularDependency { token } if token == tokens["a"]));
        assert!(order.borrow().is_empty());
        assert!(!dispatcher.is_dispatching());
    }
}
