//! Layered error definitions
//!
//! `DispatchError` covers dispatcher protocol violations and callback failures;
//! `ContractError` covers scenario loading.

use std::fmt;

use thiserror::Error;

use crate::DispatchToken;

/// Boxed error raised by a callback body
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Operation that referenced an unknown token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOperation {
    Unregister,
    WaitFor,
}

impl fmt::Display for TokenOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregister => f.write_str("unregister"),
            Self::WaitFor => f.write_str("wait_for"),
        }
    }
}

/// Dispatcher errors
///
/// All protocol variants are integration errors: they are raised at the point
/// of detection and never recovered inside the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Token is not (or no longer) registered
    #[error("{operation}(...): `{token}` does not map to a registered callback")]
    UnknownToken {
        token: DispatchToken,
        operation: TokenOperation,
    },

    /// `wait_for` called with no dispatch cycle in flight
    #[error("wait_for(...): must be invoked while dispatching")]
    NotDispatching,

    /// `wait_for` reached a callback that started but has not finished
    #[error("wait_for(...): circular dependency detected while waiting for `{token}`")]
    CircularDependency { token: DispatchToken },

    /// `dispatch` called while a cycle is in flight
    #[error("dispatch(...): cannot dispatch in the middle of a dispatch")]
    AlreadyDispatching,

    /// `unregister` called on a callback that is running in the current cycle
    #[error("unregister(...): `{token}` is pending in the current dispatch")]
    CallbackBusy { token: DispatchToken },

    /// Callback body failed
    #[error("callback failed: {source}")]
    Callback {
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// Create unknown token error
    pub fn unknown_token(token: DispatchToken, operation: TokenOperation) -> Self {
        Self::UnknownToken { token, operation }
    }

    /// Create circular dependency error
    pub fn circular(token: DispatchToken) -> Self {
        Self::CircularDependency { token }
    }

    /// Wrap a callback failure
    pub fn callback(source: impl Into<BoxError>) -> Self {
        Self::Callback {
            source: source.into(),
        }
    }

    /// Stable identifier, suitable for metrics labels and programmatic matching
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownToken {
                operation: TokenOperation::Unregister,
                ..
            } => "dispatcher-unregister-not-map",
            Self::UnknownToken {
                operation: TokenOperation::WaitFor,
                ..
            } => "dispatcher-waitfor-invalid-token",
            Self::NotDispatching => "dispatcher-waitfor-invoked-outside-dispatch",
            Self::CircularDependency { .. } => "dispatcher-waitfor-circular-dependency",
            Self::AlreadyDispatching => "dispatcher-cant-dispatch-while-dispatching",
            Self::CallbackBusy { .. } => "dispatcher-unregister-while-pending",
            Self::Callback { .. } => "dispatcher-callback-failed",
        }
    }

    /// Token the error is about, if any
    pub fn token(&self) -> Option<DispatchToken> {
        match self {
            Self::UnknownToken { token, .. }
            | Self::CircularDependency { token }
            | Self::CallbackBusy { token } => Some(*token),
            _ => None,
        }
    }
}

/// Scenario loading errors
#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
