//! Mock dispatcher implementation for testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{
    DispatchFailure, DispatchOutcome, DispatchSuccess, RequestDispatcher, SearchParams,
};

/// A recorded dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    pub operation: String,
    pub params: SearchParams,
}

/// Mock dispatcher for testing.
///
/// Queued outcomes are returned in order. Once the queue is empty every call
/// gets a status-0 failure, so an unscripted call shows up as an error.
#[derive(Default)]
pub struct MockDispatcher {
    calls: RwLock<Vec<DispatchCall>>,
    outcomes: RwLock<VecDeque<DispatchOutcome>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_outcome(&self, outcome: DispatchOutcome) {
        self.outcomes.write().await.push_back(outcome);
    }

    pub async fn push_success(&self, payload: Value) {
        self.push_outcome(Ok(DispatchSuccess::ok(payload))).await;
    }

    pub async fn push_failure(&self, status_code: u16, payload: Value) {
        self.push_outcome(Err(DispatchFailure::status(status_code, payload)))
            .await;
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn calls(&self) -> Vec<DispatchCall> {
        self.calls.read().await.clone()
    }

    pub async fn last_call(&self) -> Option<DispatchCall> {
        self.calls.read().await.last().cloned()
    }
}

#[async_trait]
impl RequestDispatcher for MockDispatcher {
    async fn dispatch(&self, operation: &str, params: &SearchParams) -> DispatchOutcome {
        self.calls.write().await.push(DispatchCall {
            operation: operation.to_string(),
            params: params.clone(),
        });

        self.outcomes.write().await.pop_front().unwrap_or_else(|| {
            Err(DispatchFailure::transport(
                operation,
                "no mock outcome queued",
            ))
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
