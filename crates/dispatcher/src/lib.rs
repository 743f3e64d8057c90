//! # Dispatcher
//!
//! Synchronous broadcast dispatcher.
//!
//! Responsibilities:
//! - Register callbacks under opaque tokens
//! - Broadcast each payload to every registered callback, once per cycle
//! - Let a callback wait for other callbacks (`wait_for`) and detect cycles
//! - Reject re-entrant dispatch
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use dispatcher::Dispatcher;
//!
//! let dispatcher: Dispatcher<String> = Dispatcher::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&log);
//! let audit = dispatcher.register(move |_, payload: &String| {
//!     sink.borrow_mut().push(format!("audit:{payload}"));
//!     Ok(())
//! });
//!
//! let sink = Rc::clone(&log);
//! dispatcher.register(move |d, payload: &String| {
//!     d.wait_for(&[audit])?;
//!     sink.borrow_mut().push(format!("view:{payload}"));
//!     Ok(())
//! });
//!
//! dispatcher.dispatch("hello".to_string()).unwrap();
//! assert_eq!(*log.borrow(), ["audit:hello", "view:hello"]);
//! ```

mod callback;
mod cycle;
pub mod dispatcher;
pub mod metrics;

pub use callback::Callback;
pub use contracts::{DispatchError, DispatchToken, DispatcherConfig, TokenOperation};
pub use cycle::CallbackState;
pub use dispatcher::Dispatcher;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
