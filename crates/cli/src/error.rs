//! Error types for CLI operations.

use contracts::DispatchError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Scenario file not found
    #[error("Scenario file not found: {path}")]
    ConfigNotFound { path: String },

    /// A dispatch failed and the run was told to stop
    #[error("Dispatch of action #{index} ({kind}) failed: {source}")]
    DispatchFailed {
        index: usize,
        kind: String,
        #[source]
        source: DispatchError,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn dispatch_failed(index: usize, kind: impl Into<String>, source: DispatchError) -> Self {
        Self::DispatchFailed {
            index,
            kind: kind.into(),
            source,
        }
    }
}
