//! Property tests for path normalization and parameter parsing.

use poptop::{normalize, parse_params};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z_]{0,8}",
        (0i64..100_000).prop_map(|id| id.to_string()),
        ":[a-z_]{1,6}",
    ]
}

fn path() -> impl Strategy<Value = String> {
    (prop::collection::vec(segment(), 0..6), any::<bool>()).prop_map(|(segments, leading)| {
        let joined = segments.join("/");
        if leading {
            format!("/{joined}")
        } else {
            joined
        }
    })
}

proptest! {
    #[test]
    fn test_normalize_is_idempotent(path in path()) {
        let once = normalize(&path);
        let twice = normalize(once.template.as_str());
        prop_assert_eq!(&once.template, &twice.template);
        prop_assert!(twice.ids.is_empty());
    }

    #[test]
    fn test_ids_follow_segment_order(ids in prop::collection::vec(0i64..1_000_000, 1..5)) {
        let path: String = ids.iter().map(|id| format!("/seg/{id}")).collect();
        let normalized = normalize(&path);
        prop_assert_eq!(&normalized.ids, &ids);
        prop_assert_eq!(normalized.item_id, ids.last().copied());
        prop_assert_eq!(normalized.template.as_str(), "/seg/:id".repeat(ids.len()));
    }

    #[test]
    fn test_parsed_values_are_never_blank(raw in "[a-z=& %20]{0,40}") {
        if let Some(params) = parse_params(&raw) {
            for (_, values) in params.iter() {
                prop_assert!(values.iter().all(|v| !v.trim().is_empty()));
            }
        }
    }
}
