//! Request dispatch to the remote directory service.
//!
//! This module contains:
//! - `RequestDispatcher` trait: one named remote operation per call
//! - Outcome types: `DispatchSuccess` / `DispatchFailure`
//! - Implementations: HTTP (reqwest), Mock

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SearchError;

pub mod http;
pub mod mock;

pub use http::HttpDispatcher;
pub use mock::{DispatchCall, MockDispatcher};

/// Default operation for user lookups.
pub const USER_SEARCH: &str = "userSearch";
/// Operation for group lookups.
pub const GROUP_SEARCH: &str = "groupSearch";

/// Parameters sent with a remote operation, in stable key order.
pub type SearchParams = BTreeMap<String, String>;

/// Result of a single dispatch. Exactly one branch is produced per call.
pub type DispatchOutcome = std::result::Result<DispatchSuccess, DispatchFailure>;

// ============================================================================
// Outcome types
// ============================================================================

/// HTTP-level details of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Final request URL (or the operation name when no URL was resolved).
    pub url: String,
    /// Canonical reason phrase for the status, if any.
    pub reason: Option<String>,
    /// `Content-Type` header of the response.
    pub content_type: Option<String>,
}

/// Success branch of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSuccess {
    pub payload: Value,
    pub meta: ResponseMeta,
    pub status_code: u16,
}

impl DispatchSuccess {
    /// A 200 response carrying `payload`.
    pub fn ok(payload: Value) -> Self {
        Self {
            payload,
            meta: ResponseMeta {
                reason: Some("OK".to_string()),
                ..Default::default()
            },
            status_code: 200,
        }
    }
}

/// Failure branch of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchFailure {
    pub payload: Value,
    pub meta: ResponseMeta,
    pub status_code: u16,
}

impl DispatchFailure {
    /// A non-success response with the given status and body.
    pub fn status(status_code: u16, payload: Value) -> Self {
        Self {
            payload,
            meta: ResponseMeta::default(),
            status_code,
        }
    }

    /// No response was received. Status is `0` and `message` becomes the
    /// single error message.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            payload: serde_json::json!({ "errorMessages": [message.into()] }),
            meta: ResponseMeta {
                url: url.into(),
                ..Default::default()
            },
            status_code: 0,
        }
    }

    /// Extract the status code and message list.
    ///
    /// Messages are taken from `errorMessages`, then the values of `errors`.
    /// When neither yields anything, falls back to a plain-text body and
    /// finally to the reason phrase.
    pub fn into_search_error(self) -> SearchError {
        let mut messages = Vec::new();

        if let Value::Object(body) = &self.payload {
            if let Some(Value::Array(items)) = body.get("errorMessages") {
                messages.extend(items.iter().map(message_text));
            }
            if let Some(Value::Object(fields)) = body.get("errors") {
                messages.extend(fields.values().map(message_text));
            }
        }

        if messages.is_empty() {
            match self.payload {
                Value::String(text) if !text.trim().is_empty() => messages.push(text),
                _ => messages.extend(self.meta.reason),
            }
        }

        SearchError::new(self.status_code, messages)
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Issues one call to a named remote operation.
///
/// Implementations:
/// - `HttpDispatcher`: REST calls via reqwest
/// - `MockDispatcher`: scripted outcomes for testing
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    /// Call `operation` with `params`.
    ///
    /// Performs exactly one request; never retries. A call that gets no
    /// response resolves to a `DispatchFailure` with status `0`.
    async fn dispatch(&self, operation: &str, params: &SearchParams) -> DispatchOutcome;

    /// Dispatcher name for logging.
    fn name(&self) -> &str;
}

/// Errors building a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
