//! Todo App Example
//!
//! Hand-wired stores on one dispatcher: a todo list, a counter that must see
//! the list first, and a view that renders after both.
//!
//! Run with: cargo run -p demos --bin todo_app

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use contracts::{Action, DispatchError, DispatcherConfig};
use dispatcher::Dispatcher;
use observability::{LogFormat, ObservabilityConfig};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Compact,
        ..Default::default()
    })?;

    tracing::info!("Starting Todo App Demo");

    let dispatcher: Dispatcher<Action> = Dispatcher::with_config(DispatcherConfig {
        name: "todo-app".to_string(),
        record_metrics: false,
    });

    // ==== Stores ====
    let todos: Rc<RefCell<Vec<String>>> = Rc::default();
    let count = Rc::new(Cell::new(0usize));

    let list = Rc::clone(&todos);
    let todo_token = dispatcher.register(move |_, action: &Action| {
        match action.kind.as_str() {
            "todo/create" => {
                let text = action
                    .data
                    .get("text")
                    .and_then(|t| t.as_str())
                    .ok_or_else(|| DispatchError::callback("todo/create without text"))?;
                list.borrow_mut().push(text.to_string());
            }
            "todo/clear" => list.borrow_mut().clear(),
            _ => {}
        }
        Ok(())
    });

    let list = Rc::clone(&todos);
    let counter = Rc::clone(&count);
    let count_token = dispatcher.register(move |d: &Dispatcher<Action>, _: &Action| {
        d.wait_for(&[todo_token])?;
        counter.set(list.borrow().len());
        Ok(())
    });

    // Registered last, waits for both
    let list = Rc::clone(&todos);
    let counter = Rc::clone(&count);
    let view_token = dispatcher.register(move |d: &Dispatcher<Action>, action: &Action| {
        d.wait_for(&[count_token, todo_token])?;
        tracing::info!(
            action = %action.kind,
            count = counter.get(),
            todos = ?list.borrow(),
            "View rendered"
        );
        Ok(())
    });

    tracing::info!(
        todo = %todo_token,
        count = %count_token,
        view = %view_token,
        "Stores registered"
    );

    // ==== Dispatch ====
    let actions = [
        Action::with_data("todo/create", json!({ "text": "buy milk" })),
        Action::with_data("todo/create", json!({ "text": "walk dog" })),
        Action::new("todo/create"),
        Action::new("todo/clear"),
    ];

    for action in actions {
        if let Err(e) = dispatcher.dispatch(action) {
            tracing::warn!(code = e.code(), error = %e, "Dispatch failed");
        }
    }

    // ==== Protocol violations ====
    if let Err(e) = dispatcher.wait_for(&[todo_token]) {
        tracing::info!(code = e.code(), "wait_for outside a dispatch is rejected");
    }
    dispatcher.unregister(view_token)?;
    if let Err(e) = dispatcher.unregister(view_token) {
        tracing::info!(code = e.code(), "Second unregister is rejected");
    }

    let snapshot = dispatcher.metrics().snapshot();
    tracing::info!(
        completed = snapshot.cycles_completed,
        failed = snapshot.cycles_failed,
        callbacks = snapshot.callbacks_invoked,
        deferred = snapshot.deferred_invocations,
        rejected = snapshot.rejected_calls,
        "Demo finished"
    );

    Ok(())
}
