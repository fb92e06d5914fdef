//! Integration tests for the REST cache semantics seen through the public API.
//!
//! These tests drive a `Dispatcher` end to end: registration, GET warming,
//! POST/DELETE mutation, removal and route recognition.

use assert_json_diff::assert_json_eq;
use bytes::Bytes;
use poptop::{
    parse_params, CachedJsonResource, DispatchError, Dispatcher, FnResource, Outcome, Params,
    Payload, Registry,
};
use serde_json::json;
use std::sync::Arc;

const EXAMPLE: &str = "/path/to/example";
const FIXTURE: &str = r#"[
    {"id": 123, "name": "first"},
    {"id": 456, "name": "second"}
]"#;

fn dispatcher() -> Dispatcher {
    let dispatcher = Dispatcher::new(Arc::new(Registry::new()));
    dispatcher
        .registry()
        .add(CachedJsonResource::from_raw(EXAMPLE, FIXTURE).unwrap());
    dispatcher
}

fn served(outcome: Result<Outcome, DispatchError>) -> poptop::MockResponse {
    outcome
        .expect("dispatch failed")
        .into_response()
        .expect("request not handled")
}

#[test]
fn test_params_accumulate_in_order() {
    let params = parse_params("foo=bar&baz=quux&foo=biz").unwrap();
    let expected: Params = [("foo", "bar"), ("baz", "quux"), ("foo", "biz")]
        .into_iter()
        .collect();
    assert_eq!(params, expected);
    assert_eq!(params.get_all("foo"), ["bar", "biz"]);
}

#[test]
fn test_params_drop_blank_and_malformed() {
    let params = parse_params("foo=&bar=baz&123!!").unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params.get("bar"), Some("baz"));
    assert!(!params.contains_key("foo"));
}

#[test]
fn test_item_is_byte_identical_slice_of_collection() {
    let dispatcher = dispatcher();

    let collection = served(dispatcher.handle("GET", EXAMPLE, None, None));
    let item = served(dispatcher.handle("GET", "/path/to/example/123", None, None));

    assert_eq!(collection.body, Bytes::from_static(FIXTURE.as_bytes()));
    assert_eq!(item.text(), r#"{"id": 123, "name": "first"}"#);
    assert!(collection.text().contains(&item.text()));
}

#[test]
fn test_warmed_collection_is_rebuilt_from_cache() {
    let dispatcher = dispatcher();
    served(dispatcher.handle("GET", EXAMPLE, None, None));
    served(dispatcher.handle("DELETE", "/path/to/example/456", None, None));

    let listing = served(dispatcher.handle("GET", EXAMPLE, None, None));
    let value: serde_json::Value = serde_json::from_slice(&listing.body).unwrap();
    assert_json_eq!(value, json!([{"id": 123, "name": "first"}]));
}

#[test]
fn test_post_then_delete_empties_cache() {
    let dispatcher = Dispatcher::new(Arc::new(Registry::new()));
    dispatcher.registry().add(FnResource::new(EXAMPLE, |_| {
        Ok(Payload::new(r#"{"id":123}"#).with_id(123))
    }));

    served(dispatcher.handle("POST", EXAMPLE, None, None));
    assert!(!dispatcher.registry().cache_is_empty(EXAMPLE));

    served(dispatcher.handle("DELETE", "/path/to/example/123", None, None));
    assert!(dispatcher.registry().cache_is_empty(EXAMPLE));

    let again = dispatcher.handle("DELETE", "/path/to/example/123", None, None);
    assert!(again.unwrap().is_handled());
}

#[test]
fn test_remove_then_re_add_starts_cold() {
    let dispatcher = dispatcher();
    served(dispatcher.handle("GET", EXAMPLE, None, None));
    assert_eq!(dispatcher.registry().cached_ids(EXAMPLE), vec![123, 456]);

    assert!(dispatcher.registry().remove(EXAMPLE));
    dispatcher.registry().add(CachedJsonResource::new(
        EXAMPLE,
        &json!([{"id": 789, "name": "replacement"}]),
    ));
    assert!(dispatcher.registry().cache_is_empty(EXAMPLE));

    let err = dispatcher
        .handle("GET", "/path/to/example/123", None, None)
        .unwrap_err();
    assert_eq!(err.status(), http::StatusCode::NOT_FOUND);
    assert_eq!(dispatcher.registry().cached_ids(EXAMPLE), vec![789]);
}

#[test]
fn test_recognition_ignores_placeholder_spelling() {
    let registry = Registry::new();
    registry.add(CachedJsonResource::new("/users/:user_id/pets", &json!([])));
    assert!(registry.can_handle("/users/42/pets"));
    assert!(registry.can_handle("users/7/pets/"));
    assert!(!registry.can_handle("/users/pets"));

    let registry = Registry::new();
    registry.add(CachedJsonResource::new("/users/42/pets", &json!([])));
    assert!(registry.can_handle("/users/:id/pets"));
}

#[test]
fn test_full_url_targets() {
    let dispatcher = dispatcher();
    let response = served(dispatcher.handle_target(
        "GET",
        "https://api.example.com/path/to/example/456?verbose=1#top",
        None,
    ));
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_json_eq!(value, json!({"id": 456, "name": "second"}));
}
