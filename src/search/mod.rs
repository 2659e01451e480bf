//! User and group searches against the remote directory.
//!
//! `DirectorySearch` composes a `RequestDispatcher`, the normalizer, and a
//! `DiagnosticSink`. The plain `search_users` / `search_groups` operations
//! never fail: transport failures and malformed responses are reported to the
//! sink and turned into an empty list. The `*_checked` variants return the
//! same result but keep the failure distinguishable.

use std::sync::Arc;

use tracing::debug;

use crate::diagnostics::DiagnosticSink;
use crate::dispatch::{DispatchSuccess, RequestDispatcher, SearchParams, GROUP_SEARCH, USER_SEARCH};
use crate::error::{SearchFailure, ShapeMismatch};
use crate::normalize::{normalize_groups, normalize_users, GroupRecord, UserRecord};

mod options;

pub use options::{trim_wildcards, GroupSearchOptions, SearchQuery, UserSearchOptions};

/// Result count requested when the caller does not choose one.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Directory search operations.
///
/// Holds no per-call state, so one instance can serve concurrent searches.
#[derive(Clone)]
pub struct DirectorySearch {
    dispatcher: Arc<dyn RequestDispatcher>,
    sink: Arc<dyn DiagnosticSink>,
}

impl DirectorySearch {
    pub fn new(dispatcher: Arc<dyn RequestDispatcher>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { dispatcher, sink }
    }

    /// Search users. Returns an empty list on any failure.
    pub async fn search_users(&self, options: &UserSearchOptions) -> Vec<UserRecord> {
        self.search_users_checked(options).await.unwrap_or_default()
    }

    /// Search groups. Returns an empty list on any failure.
    pub async fn search_groups(&self, options: &GroupSearchOptions) -> Vec<GroupRecord> {
        self.search_groups_checked(options).await.unwrap_or_default()
    }

    /// Search users, keeping failures distinguishable from an empty result.
    ///
    /// Failures are still reported to the diagnostic sink.
    pub async fn search_users_checked(
        &self,
        options: &UserSearchOptions,
    ) -> Result<Vec<UserRecord>, SearchFailure> {
        let query = SearchQuery::for_users(options);
        let operation = query.method_override.as_deref().unwrap_or(USER_SEARCH);
        let params = query.user_params();

        debug!(
            operation = %operation,
            term = %query.term,
            max_results = query.max_results,
            minimal = query.minimal,
            "Searching users"
        );

        let success = self.dispatch("User", operation, &params).await?;
        let users = normalize_users(&success.payload, query.minimal)
            .map_err(|e| self.report_shape_mismatch("User", operation, e))?;

        debug!(operation = %operation, count = users.len(), "User search complete");
        Ok(users)
    }

    /// Search groups, keeping failures distinguishable from an empty result.
    ///
    /// Failures are still reported to the diagnostic sink.
    pub async fn search_groups_checked(
        &self,
        options: &GroupSearchOptions,
    ) -> Result<Vec<GroupRecord>, SearchFailure> {
        let query = SearchQuery::for_groups(options);
        let params = query.group_params();

        debug!(
            operation = GROUP_SEARCH,
            term = %query.term,
            max_results = query.max_results,
            minimal = query.minimal,
            "Searching groups"
        );

        let success = self.dispatch("Group", GROUP_SEARCH, &params).await?;
        let groups = normalize_groups(&success.payload, query.minimal)
            .map_err(|e| self.report_shape_mismatch("Group", GROUP_SEARCH, e))?;

        debug!(operation = GROUP_SEARCH, count = groups.len(), "Group search complete");
        Ok(groups)
    }

    async fn dispatch(
        &self,
        kind: &str,
        operation: &str,
        params: &SearchParams,
    ) -> Result<DispatchSuccess, SearchFailure> {
        match self.dispatcher.dispatch(operation, params).await {
            Ok(success) => Ok(success),
            Err(failure) => {
                let error = failure.into_search_error();
                let message = if error.messages.is_empty() {
                    format!(
                        "{} search ({}) failed with status {}",
                        kind, operation, error.status_code
                    )
                } else {
                    format!(
                        "{} search ({}) failed with status {}: {}",
                        kind,
                        operation,
                        error.status_code,
                        error.messages.join(", ")
                    )
                };
                self.sink.error(&message);
                Err(SearchFailure::Transport(error))
            }
        }
    }

    fn report_shape_mismatch(
        &self,
        kind: &str,
        operation: &str,
        mismatch: ShapeMismatch,
    ) -> SearchFailure {
        self.sink.error(&format!(
            "{} search ({}) returned a malformed response: {}",
            kind, operation, mismatch
        ));
        SearchFailure::ShapeMismatch(mismatch)
    }
}

#[cfg(test)]
mod tests;
