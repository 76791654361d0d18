//! Hook payload parsing.

use serde_json::Value;

use crate::error::{RelayError, Result};

/// One notification, built from a single stdin payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub message: String,
}

impl NotificationEvent {
    /// Extract `field` from a JSON object payload.
    ///
    /// Other fields (session id, transcript path, ...) are ignored. The field
    /// must be present and hold a string; there is no default message.
    pub fn parse(payload: &str, field: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| RelayError::Parse(format!("not valid JSON: {e}")))?;

        let Value::Object(map) = value else {
            return Err(RelayError::Parse("payload is not a JSON object".into()));
        };

        match map.get(field) {
            Some(Value::String(message)) => Ok(Self {
                message: message.clone(),
            }),
            Some(other) => Err(RelayError::Parse(format!(
                "field '{field}' is not a string (got {other})"
            ))),
            None => Err(RelayError::Parse(format!("missing field '{field}'"))),
        }
    }
}
