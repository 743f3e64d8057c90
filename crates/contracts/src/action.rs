//! Action - tagged payload envelope
//!
//! The dispatcher is generic over its payload; `Action` is the default shape
//! for hosts that route on an event kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Action kind plus free-form data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Action {
    /// Kind tag (e.g. "todo/create")
    #[validate(length(min = 1))]
    pub kind: String,

    /// Associated data
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Action {
    /// Create an action without data
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: Value::Null,
        }
    }

    /// Create an action carrying data
    pub fn with_data(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Whether this action has the given kind
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_without_data() {
        let action: Action = serde_json::from_str(r#"{"kind": "todo/clear"}"#).unwrap();
        assert!(action.is("todo/clear"));
        assert_eq!(action.data, Value::Null);
    }

    #[test]
    fn test_empty_kind_is_invalid() {
        assert!(Action::new("").validate().is_err());
        assert!(Action::with_data("todo/create", json!({"text": "milk"}))
            .validate()
            .is_ok());
    }
}
