//! # Contracts
//!
//! Shared interface types for the dispatcher workspace: subscription tokens,
//! the dispatcher error taxonomy, the `Action` payload envelope and the
//! scenario blueprint produced by the config loader.
//!
//! Every other crate may depend on this one; it depends on none of them.

mod action;
mod blueprint;
mod error;
mod token;

pub use action::Action;
pub use blueprint::*;
pub use error::*;
pub use token::DispatchToken;
