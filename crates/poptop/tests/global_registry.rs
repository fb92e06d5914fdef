//! Tests for the process-wide default registry.
//!
//! Every test shares `Registry::global()`, so they run serially and reset it
//! before use.

use poptop::config::MockConfig;
use poptop::{CachedJsonResource, Dispatcher, Outcome, Registry, UnhandledReason};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;

fn fresh_global() -> Dispatcher {
    Registry::global().reset();
    Dispatcher::global()
}

#[test]
#[serial]
fn test_global_dispatcher_shares_registry() {
    let dispatcher = fresh_global();
    Registry::global().add(CachedJsonResource::new("/global", &json!([{"id": 1}])));

    assert!(Arc::ptr_eq(dispatcher.registry(), &Registry::global()));
    let outcome = dispatcher.handle("GET", "/global/1", None, None).unwrap();
    assert!(outcome.is_handled());
}

#[test]
#[serial]
fn test_reset_forgets_everything() {
    let dispatcher = fresh_global();
    Registry::global().add(CachedJsonResource::new("/global", &json!([{"id": 1}])));
    dispatcher.handle("GET", "/global", None, None).unwrap();

    Registry::global().reset();
    assert!(Registry::global().is_empty());
    assert!(Registry::global().cache_is_empty("/global"));
    assert_eq!(
        dispatcher.handle("GET", "/global", None, None).unwrap(),
        Outcome::Unhandled(UnhandledReason::NoRoute)
    );
}

#[test]
#[serial]
fn test_config_installs_into_global() {
    let dispatcher = fresh_global();
    let config = MockConfig::from_yaml(
        "resources:\n  - identifier: /a\n    body: []\n  - identifier: /b/:b_id\n    rest: false\n    body: hello\n",
    )
    .unwrap();

    assert_eq!(config.install(&Registry::global()).unwrap(), 2);
    let response = dispatcher
        .handle("GET", "/b/3", None, None)
        .unwrap()
        .into_response()
        .unwrap();
    assert_eq!(response.text(), "hello");
}
