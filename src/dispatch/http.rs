//! HTTP dispatcher for REST directory services.
//!
//! Maps operation names to REST paths under a base URL and issues one `GET`
//! per dispatch, with the parameters as the query string.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    DispatchFailure, DispatchOutcome, DispatchSuccess, DispatcherError, RequestDispatcher,
    ResponseMeta, SearchParams, GROUP_SEARCH, USER_SEARCH,
};
use crate::config::{AuthConfig, DirectoryConfig};

/// Built-in REST path for `userSearch`.
pub const USER_SEARCH_PATH: &str = "/rest/api/2/user/search";
/// Built-in REST path for `groupSearch`.
pub const GROUP_SEARCH_PATH: &str = "/rest/api/2/groups/picker";

/// HTTP dispatcher.
///
/// Operation names are matched case-insensitively.
pub struct HttpDispatcher {
    client: Client,
    base_url: Url,
    auth: Option<AuthConfig>,
    operations: HashMap<String, String>,
}

impl HttpDispatcher {
    /// Create a dispatcher from directory configuration.
    pub fn new(config: &DirectoryConfig) -> Result<Self, DispatcherError> {
        if config.base_url.is_empty() {
            return Err(DispatcherError::Config(
                "directory base_url not configured".to_string(),
            ));
        }

        if config.timeout_secs == 0 {
            return Err(DispatcherError::Config(
                "directory timeout_secs must be greater than zero".to_string(),
            ));
        }

        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            DispatcherError::Config(format!("invalid base_url '{}': {}", config.base_url, e))
        })?;
        // Url::join replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        let mut operations = HashMap::from([
            (USER_SEARCH.to_lowercase(), USER_SEARCH_PATH.to_string()),
            (GROUP_SEARCH.to_lowercase(), GROUP_SEARCH_PATH.to_string()),
        ]);
        for (name, path) in &config.operations {
            operations.insert(name.to_lowercase(), path.clone());
        }

        Ok(Self {
            client,
            base_url,
            auth: config.auth.clone(),
            operations,
        })
    }

    /// Register (or replace) an operation path.
    pub fn with_operation(mut self, name: &str, path: &str) -> Self {
        self.operations.insert(name.to_lowercase(), path.to_string());
        self
    }

    /// Resolve the URL for an operation, if it is known.
    pub fn endpoint(&self, operation: &str) -> Option<Url> {
        let path = self.operations.get(&operation.to_lowercase())?;
        self.base_url.join(path.trim_start_matches('/')).ok()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(AuthConfig::Bearer { token }) => request.bearer_auth(token),
            Some(AuthConfig::Basic {
                username,
                api_token,
            }) => request.basic_auth(username, Some(api_token)),
            None => request,
        }
    }
}

/// Parse a response body, keeping non-JSON text on the failure branch.
fn parse_body(body: &str, success: bool) -> Value {
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if success || body.trim().is_empty() => Value::Null,
        Err(_) => Value::String(body.to_string()),
    }
}

/// Describe a reqwest error with its cause.
///
/// reqwest's `Display` omits the source chain, so timeouts, refused
/// connections and DNS failures would otherwise read the same.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl RequestDispatcher for HttpDispatcher {
    async fn dispatch(&self, operation: &str, params: &SearchParams) -> DispatchOutcome {
        let Some(url) = self.endpoint(operation) else {
            warn!(operation = %operation, "Unknown directory operation");
            return Err(DispatchFailure::transport(
                operation,
                format!("unknown operation '{}'", operation),
            ));
        };

        let request = self.authorize(self.client.get(url.clone()).query(params));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    operation = %operation,
                    url = %url,
                    error = %e,
                    "Directory request got no response"
                );
                return Err(DispatchFailure::transport(
                    url.as_str(),
                    describe_transport_error(&e),
                ));
            }
        };

        let status = response.status();
        let meta = ResponseMeta {
            url: response.url().to_string(),
            reason: status.canonical_reason().map(str::to_string),
            content_type: response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(
                    operation = %operation,
                    status = %status,
                    error = %e,
                    "Failed to read directory response body"
                );
                let mut failure =
                    DispatchFailure::transport(meta.url.clone(), describe_transport_error(&e));
                failure.meta = meta;
                failure.status_code = status.as_u16();
                return Err(failure);
            }
        };

        if status.is_success() {
            debug!(
                operation = %operation,
                status = %status,
                "Directory request succeeded"
            );
            Ok(DispatchSuccess {
                payload: parse_body(&body, true),
                meta,
                status_code: status.as_u16(),
            })
        } else {
            warn!(
                operation = %operation,
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Directory request failed"
            );
            Err(DispatchFailure {
                payload: parse_body(&body, false),
                meta,
                status_code: status.as_u16(),
            })
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
