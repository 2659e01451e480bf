//! Error types for directory searches.
//!
//! The lenient search operations never return these; they are reported to the
//! diagnostic sink and surfaced only through the `*_checked` variants.

use serde_json::Value;

/// Failure outcome reported by the directory service or the transport.
///
/// A `status_code` of `0` means no response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status {status_code}: {}", .messages.join(", "))]
pub struct SearchError {
    pub status_code: u16,
    pub messages: Vec<String>,
}

impl SearchError {
    pub fn new(status_code: u16, messages: Vec<String>) -> Self {
        Self {
            status_code,
            messages,
        }
    }

    /// True when the request never reached the directory service.
    pub fn is_transport(&self) -> bool {
        self.status_code == 0
    }
}

/// A success payload that does not match the structure the normalizer expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeMismatch {
    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("response has no `{0}` key")]
    MissingKey(&'static str),

    #[error("record {index} is {found}, expected an object")]
    RecordNotObject { index: usize, found: &'static str },
}

/// Why a checked search produced no result list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFailure {
    #[error("directory request failed with {0}")]
    Transport(#[from] SearchError),

    #[error("malformed directory response: {0}")]
    ShapeMismatch(#[from] ShapeMismatch),
}

/// Name of a JSON value's type, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
