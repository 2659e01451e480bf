//! Directory service and search default configuration.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::search::DEFAULT_MAX_RESULTS;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote directory service connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the directory service (e.g. `https://jira.example.com`).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional credentials.
    pub auth: Option<AuthConfig>,
    /// Extra operations, name -> path relative to `base_url`.
    ///
    /// Entries here may also replace the built-in `userSearch`/`groupSearch` paths.
    pub operations: HashMap<String, String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth: None,
            operations: HashMap::new(),
        }
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set credentials.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Register an operation path.
    pub fn with_operation(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.operations.insert(name.into(), path.into());
        self
    }
}

/// Credentials sent with every request.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    /// `Authorization: Bearer <token>`.
    Bearer { token: String },
    /// HTTP basic auth with an API token as password.
    Basic { username: String, api_token: String },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("api_token", &"<redacted>")
                .finish(),
        }
    }
}

/// Defaults applied to searches issued from configuration-driven callers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub max_results: u32,
    pub minimal: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            minimal: false,
        }
    }
}
