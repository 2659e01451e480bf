use super::*;
use crate::diagnostics::RecordingSink;
use crate::dispatch::{DispatchFailure, MockDispatcher};
use serde_json::{json, Value};

fn setup() -> (Arc<MockDispatcher>, Arc<RecordingSink>, DirectorySearch) {
    let dispatcher = Arc::new(MockDispatcher::new());
    let sink = Arc::new(RecordingSink::new());
    let search = DirectorySearch::new(dispatcher.clone(), sink.clone());
    (dispatcher, sink, search)
}

fn param<'a>(params: &'a SearchParams, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str)
}

// ============================================================================
// search_users
// ============================================================================

#[tokio::test]
async fn test_users_default_dispatch() {
    let (dispatcher, _sink, search) = setup();
    dispatcher.push_success(json!([])).await;

    search.search_users(&UserSearchOptions::default()).await;

    let call = dispatcher.last_call().await.unwrap();
    assert_eq!(call.operation, "userSearch");
    assert_eq!(param(&call.params, "username"), Some(""));
    assert_eq!(param(&call.params, "maxResults"), Some("100"));
    assert_eq!(param(&call.params, "query"), None);
}

#[tokio::test]
async fn test_users_method_override_dispatch() {
    let (dispatcher, _sink, search) = setup();
    dispatcher.push_success(json!([])).await;

    search
        .search_users(
            &UserSearchOptions::new("jane")
                .with_method_override("userSearchCloud")
                .with_max_results(10),
        )
        .await;

    let call = dispatcher.last_call().await.unwrap();
    assert_eq!(call.operation, "userSearchCloud");
    assert_eq!(param(&call.params, "query"), Some("jane"));
    assert_eq!(param(&call.params, "maxResults"), Some("10"));
    assert_eq!(param(&call.params, "username"), None);
}

#[tokio::test]
async fn test_users_normalized_in_order() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_success(json!([
            { "name": "zed", "displayName": "Zed", "active": true },
            { "name": "amy", "accountId": "acc-amy", "displayName": "Amy" },
            { "name": "bob", "accountId": "" }
        ]))
        .await;

    let users = search.search_users(&UserSearchOptions::new("")).await;

    assert_eq!(users.len(), 3);
    let ids: Vec<_> = users
        .iter()
        .map(|u| u.username_or_account_id.as_str())
        .collect();
    assert_eq!(ids, vec!["zed", "acc-amy", "bob"]);
    assert_eq!(users[0].active, Some(true));
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_users_minimal_drops_full_fields() {
    let (dispatcher, _sink, search) = setup();
    dispatcher
        .push_success(json!([{ "name": "zed", "active": true, "emailAddress": "z@example.com" }]))
        .await;

    let users = search
        .search_users(&UserSearchOptions::new("z").minimal(true))
        .await;

    assert_eq!(users[0].name.as_deref(), Some("zed"));
    assert_eq!(users[0].active, None);
    assert_eq!(users[0].email_address, None);
}

#[tokio::test]
async fn test_users_empty_list_is_not_an_error() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_success(json!([])).await;

    let result = search
        .search_users_checked(&UserSearchOptions::new("nobody"))
        .await;

    assert_eq!(result, Ok(vec![]));
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_users_failure_reports_status_and_message() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_failure(500, json!({ "errorMessages": ["bad request"] }))
        .await;

    let users = search.search_users(&UserSearchOptions::new("x")).await;

    assert!(users.is_empty());
    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("500"));
    assert!(messages[0].contains("bad request"));
}

#[tokio::test]
async fn test_users_failure_joins_messages_in_order() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_failure(400, json!({ "errorMessages": ["first", "second", "third"] }))
        .await;

    search.search_users(&UserSearchOptions::new("x")).await;

    assert_eq!(
        sink.messages(),
        vec!["User search (userSearch) failed with status 400: first, second, third"]
    );
}

#[tokio::test]
async fn test_users_failure_without_messages() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_failure(500, Value::Null).await;

    search.search_users(&UserSearchOptions::new("x")).await;

    assert_eq!(
        sink.messages(),
        vec!["User search (userSearch) failed with status 500"]
    );
}

#[tokio::test]
async fn test_users_transport_failure() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_outcome(Err(DispatchFailure::transport(
            "http://jira.invalid",
            "connection refused",
        )))
        .await;

    let result = search
        .search_users_checked(&UserSearchOptions::new("x"))
        .await;

    match result {
        Err(SearchFailure::Transport(error)) => {
            assert!(error.is_transport());
            assert_eq!(error.messages, vec!["connection refused"]);
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn test_users_malformed_payload() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_success(json!({ "users": [] })).await;

    let result = search
        .search_users_checked(&UserSearchOptions::new("x"))
        .await;

    assert_eq!(
        result,
        Err(SearchFailure::ShapeMismatch(ShapeMismatch::NotAnArray(
            "an object"
        )))
    );
    assert_eq!(sink.count(), 1);
    assert!(sink.messages()[0].contains("malformed"));
}

#[tokio::test]
async fn test_users_null_payload_is_lenient() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_success(Value::Null).await;

    let users = search.search_users(&UserSearchOptions::new("x")).await;

    assert!(users.is_empty());
    assert_eq!(sink.count(), 1);
}

// ============================================================================
// search_groups
// ============================================================================

#[tokio::test]
async fn test_groups_dispatch_strips_wildcards() {
    let (dispatcher, _sink, search) = setup();
    dispatcher.push_success(json!({ "groups": [] })).await;

    search
        .search_groups(&GroupSearchOptions::new("%ab%c%"))
        .await;

    let call = dispatcher.last_call().await.unwrap();
    assert_eq!(call.operation, "groupSearch");
    assert_eq!(param(&call.params, "query"), Some("ab%c"));
    assert_eq!(param(&call.params, "maxResults"), Some("100"));
}

#[tokio::test]
async fn test_groups_preserve_remote_order() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_success(json!({
            "header": "Showing 3 of 3 matching groups",
            "total": 3,
            "groups": [
                { "name": "site-admins", "html": "site-<b>admin</b>s" },
                { "name": "jira-admins", "html": "jira-<b>admin</b>s" },
                { "name": "admins", "html": "<b>admin</b>s" }
            ]
        }))
        .await;

    let groups = search.search_groups(&GroupSearchOptions::new("admin")).await;

    let names: Vec<_> = groups.iter().filter_map(|g| g.name.as_deref()).collect();
    assert_eq!(names, vec!["site-admins", "jira-admins", "admins"]);
    assert_eq!(groups[0].display_name.as_deref(), Some("site-admins"));
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_groups_empty_is_not_an_error() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_success(json!({ "groups": [] })).await;

    let result = search
        .search_groups_checked(&GroupSearchOptions::new("x"))
        .await;

    assert_eq!(result, Ok(vec![]));
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_groups_missing_key_is_malformed() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_success(json!({ "header": "Showing 0 of 0 matching groups", "total": 0 }))
        .await;

    let groups = search.search_groups(&GroupSearchOptions::new("x")).await;

    assert!(groups.is_empty());
    assert_eq!(
        sink.messages(),
        vec!["Group search (groupSearch) returned a malformed response: response has no `groups` key"]
    );
}

#[tokio::test]
async fn test_groups_bare_array_is_malformed() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_success(json!([{ "name": "a" }])).await;

    let result = search
        .search_groups_checked(&GroupSearchOptions::new("x"))
        .await;

    assert!(matches!(result, Err(SearchFailure::ShapeMismatch(_))));
    assert_eq!(sink.count(), 1);
}

#[tokio::test]
async fn test_groups_failure() {
    let (dispatcher, sink, search) = setup();
    dispatcher
        .push_failure(403, json!({ "errorMessages": ["You are not authorized"] }))
        .await;

    let groups = search.search_groups(&GroupSearchOptions::new("x")).await;

    assert!(groups.is_empty());
    assert_eq!(
        sink.messages(),
        vec!["Group search (groupSearch) failed with status 403: You are not authorized"]
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_searches_are_independent() {
    let (dispatcher, sink, search) = setup();
    dispatcher.push_success(json!([{ "name": "a" }])).await;
    dispatcher.push_success(json!({ "groups": [{ "name": "g" }] })).await;

    let users = search.clone();
    let groups = search.clone();
    let (users, groups) = tokio::join!(
        async move { users.search_users(&UserSearchOptions::new("a")).await },
        async move { groups.search_groups(&GroupSearchOptions::new("g")).await },
    );

    // join! polls in order and the mock never blocks, so the user search runs first.
    let operations: Vec<_> = dispatcher
        .calls()
        .await
        .into_iter()
        .map(|call| call.operation)
        .collect();
    assert_eq!(operations, vec!["userSearch", "groupSearch"]);

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name.as_deref(), Some("a"));
    assert_eq!(users[0].username_or_account_id, "a");

    let names: Vec<_> = groups.iter().filter_map(|g| g.name.as_deref()).collect();
    assert_eq!(names, vec!["g"]);
    assert_eq!(sink.count(), 0);
}
