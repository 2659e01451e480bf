//! Search options and per-kind parameter shaping.

use tracing::debug;

use super::DEFAULT_MAX_RESULTS;
use crate::dispatch::SearchParams;

/// Options for a user search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearchOptions {
    /// Search term. Empty matches all users.
    pub term: String,
    /// Request the reduced record variant.
    pub minimal: bool,
    /// Maximum number of results. `0` falls back to the default.
    pub max_results: u32,
    /// Alternate operation to call instead of `userSearch`.
    ///
    /// Alternate endpoints take the term as `query` rather than `username`.
    pub method_override: Option<String>,
}

impl Default for UserSearchOptions {
    fn default() -> Self {
        Self {
            term: String::new(),
            minimal: false,
            max_results: DEFAULT_MAX_RESULTS,
            method_override: None,
        }
    }
}

impl UserSearchOptions {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_method_override(mut self, operation: impl Into<String>) -> Self {
        self.method_override = Some(operation.into());
        self
    }
}

/// Options for a group search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSearchOptions {
    /// Search term. Leading/trailing `%` wildcards are stripped.
    pub term: String,
    /// Request the reduced record variant.
    pub minimal: bool,
    /// Maximum number of results. `0` falls back to the default.
    pub max_results: u32,
}

impl Default for GroupSearchOptions {
    fn default() -> Self {
        Self {
            term: String::new(),
            minimal: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl GroupSearchOptions {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    pub fn minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

/// A validated query, built per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub minimal: bool,
    /// Always greater than zero.
    pub max_results: u32,
    pub method_override: Option<String>,
}

impl SearchQuery {
    pub fn for_users(options: &UserSearchOptions) -> Self {
        Self {
            term: options.term.clone(),
            minimal: options.minimal,
            max_results: effective_max_results(options.max_results),
            method_override: options
                .method_override
                .clone()
                .filter(|operation| !operation.is_empty()),
        }
    }

    pub fn for_groups(options: &GroupSearchOptions) -> Self {
        Self {
            term: trim_wildcards(&options.term).to_string(),
            minimal: options.minimal,
            max_results: effective_max_results(options.max_results),
            method_override: None,
        }
    }

    /// Parameters for a user search: `username` (or `query` with an
    /// override) and `maxResults`.
    pub fn user_params(&self) -> SearchParams {
        let term_key = if self.method_override.is_some() {
            "query"
        } else {
            "username"
        };
        self.params(term_key)
    }

    /// Parameters for a group search: `query` and `maxResults`.
    pub fn group_params(&self) -> SearchParams {
        self.params("query")
    }

    fn params(&self, term_key: &str) -> SearchParams {
        SearchParams::from([
            (term_key.to_string(), self.term.clone()),
            ("maxResults".to_string(), self.max_results.to_string()),
        ])
    }
}

/// Strip SQL-style `%` wildcards from both ends of a term.
///
/// Interior `%` characters are kept: `"%ab%c%"` becomes `"ab%c"`.
pub fn trim_wildcards(term: &str) -> &str {
    term.trim_matches('%')
}

fn effective_max_results(max_results: u32) -> u32 {
    if max_results == 0 {
        debug!(
            default = DEFAULT_MAX_RESULTS,
            "max_results of 0 replaced by default"
        );
        DEFAULT_MAX_RESULTS
    } else {
        max_results
    }
}
