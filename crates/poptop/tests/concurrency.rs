//! Concurrent requests against one shared dispatcher.
//!
//! Every request runs under the registry lock, so interleaved GETs and
//! DELETEs always observe a cache that agrees with itself.

use poptop::{DispatchError, Dispatcher, FnResource, Outcome, Payload, Registry};
use std::sync::Arc;
use std::thread;

const WORKERS: usize = 8;
const ITERATIONS: usize = 500;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_registry_and_dispatcher_are_send_and_sync() {
    assert_send_sync::<Registry>();
    assert_send_sync::<Dispatcher>();
}

fn listed_ids(outcome: Outcome) -> Vec<i64> {
    let response = outcome.into_response().expect("collection GET handled");
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    value
        .as_array()
        .expect("collection is an array")
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

#[test]
fn test_interleaved_gets_and_deletes_stay_consistent() {
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(Registry::new())));
    dispatcher.registry().add(FnResource::new("/p", |_| {
        Ok(Payload::new(r#"[{"id":1},{"id":2},{"id":3}]"#))
    }));

    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    let ids = listed_ids(dispatcher.handle("GET", "/p", None, None).unwrap());
                    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids out of order: {ids:?}");
                    assert!(ids.iter().all(|id| (1..=3).contains(id)));

                    match dispatcher.handle("GET", "/p/2", None, None) {
                        Ok(outcome) => assert!(outcome.is_handled()),
                        Err(DispatchError::NotFound { id: 2, .. }) => {}
                        Err(e) => panic!("unexpected failure: {e}"),
                    }

                    assert!(dispatcher
                        .handle("DELETE", "/p/2", None, None)
                        .unwrap()
                        .is_handled());
                    assert!(dispatcher
                        .handle("DELETE", "/p", None, None)
                        .unwrap()
                        .is_handled());
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let ids = listed_ids(dispatcher.handle("GET", "/p", None, None).unwrap());
    assert_eq!(dispatcher.registry().cached_ids("/p"), ids);
    assert_eq!(ids, vec![1, 2, 3]);
}
