//! ScenarioBlueprint - Config Loader output
//!
//! Describes a dispatcher, the stores registered on it with their declared
//! dependencies, and the actions to dispatch.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::Action;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete scenario blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScenarioBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Dispatcher settings
    #[serde(default)]
    #[validate(nested)]
    pub dispatcher: DispatcherConfig,

    /// Stores, in registration order
    #[serde(default)]
    #[validate(nested)]
    pub stores: Vec<StoreConfig>,

    /// Actions, in dispatch order
    #[serde(default)]
    #[validate(nested)]
    pub actions: Vec<Action>,
}

impl ScenarioBlueprint {
    /// Look up a store by name
    pub fn store(&self, name: &str) -> Option<&StoreConfig> {
        self.stores.iter().find(|s| s.name == name)
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DispatcherConfig {
    /// Label used in logs and metrics
    #[serde(default = "default_dispatcher_name")]
    #[validate(length(min = 1))]
    pub name: String,

    /// Feed the global metrics recorder
    #[serde(default = "default_record_metrics")]
    pub record_metrics: bool,
}

fn default_dispatcher_name() -> String {
    "default".to_string()
}

fn default_record_metrics() -> bool {
    true
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: default_dispatcher_name(),
            record_metrics: default_record_metrics(),
        }
    }
}

impl DispatcherConfig {
    /// Default settings under a custom name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A store: one registered callback with declared dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Unique store name
    #[validate(length(min = 1))]
    pub name: String,

    /// Stores that must finish before this one proceeds
    #[serde(default)]
    pub wait_for: Vec<String>,

    /// Action kinds this store reacts to (empty = every kind)
    #[serde(default)]
    pub handles: Vec<String>,

    /// Action kinds on which this store fails
    #[serde(default)]
    pub fail_on: Vec<String>,
}

impl StoreConfig {
    /// Create a store reacting to every action
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wait_for: Vec::new(),
            handles: Vec::new(),
            fail_on: Vec::new(),
        }
    }

    /// Whether the store reacts to `kind`
    pub fn handles_kind(&self, kind: &str) -> bool {
        self.handles.is_empty() || self.handles.iter().any(|k| k == kind)
    }

    /// Whether the store fails on `kind`
    pub fn fails_on(&self, kind: &str) -> bool {
        self.fail_on.iter().any(|k| k == kind)
    }
}
