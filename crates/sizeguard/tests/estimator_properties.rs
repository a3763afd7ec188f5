use proptest::prelude::*;
use serde_json::json;
use sizeguard::json_size::{estimate, SizeEstimate};
use sizeguard::{DispatchSerializer, EncodeOptions, Encoder, ThresholdPolicy, Value};
use sizeguard_json_pack::json::FastJsonEncoder;
use sizeguard_json_pack::Object;

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| json!(f)),
        "\\PC{0,16}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(5, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(serde_json::Value::Array),
            prop::collection::vec(("[a-z]{0,8}", inner), 0..8)
                .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Tree-shaped values whose strings need no escaping: every scalar kind,
/// byte sequences, non-string keys and opaque values.
fn arb_plain_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        any::<u64>().prop_map(Value::UInteger),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        "[a-zA-Z0-9 éß😀]{0,16}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..48).prop_map(Value::bytes),
        any::<i32>().prop_map(Value::opaque),
    ];
    let key = prop_oneof![
        "[a-z]{0,8}".prop_map(Value::from),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        Just(Value::Null),
    ]
    .boxed();
    leaf.prop_recursive(5, 64, 8, move |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::from),
            prop::collection::vec((key.clone(), inner), 0..8)
                .prop_map(|entries| Value::Object(Object::from_entries(entries))),
        ]
    })
}

/// Appends one byte to the `n`th string leaf (in document order, values only),
/// returning `true` when a string was found.
fn grow_nth_string(doc: &mut serde_json::Value, n: &mut usize) -> bool {
    match doc {
        serde_json::Value::String(s) => {
            if *n == 0 {
                s.push('z');
                return true;
            }
            *n -= 1;
            false
        }
        serde_json::Value::Array(items) => items.iter_mut().any(|item| grow_nth_string(item, n)),
        serde_json::Value::Object(map) => map.values_mut().any(|item| grow_nth_string(item, n)),
        _ => false,
    }
}

fn total(doc: &serde_json::Value) -> u64 {
    estimate(&Value::from(doc.clone())).unwrap().total
}

proptest! {
    #[test]
    fn estimate_bounds_compact_fast_output(value in arb_plain_value()) {
        let estimate = estimate(&value).unwrap();
        let bytes = FastJsonEncoder::new()
            .encode(&value, &EncodeOptions::default())
            .unwrap();
        prop_assert!(
            estimate.total >= bytes.len() as u64,
            "estimate {} below encoded {}",
            estimate.total,
            bytes.len()
        );
    }

    #[test]
    fn estimate_is_deterministic(doc in arb_json()) {
        let value = Value::from(doc);
        let first = estimate(&value).unwrap();
        prop_assert_eq!(estimate(&value).unwrap(), first);
    }

    #[test]
    fn acyclic_values_never_overflow(doc in arb_json()) {
        let estimate: SizeEstimate = estimate(&Value::from(doc)).unwrap();
        prop_assert!(estimate.total >= estimate.largest_leaf);
    }

    #[test]
    fn growing_a_string_never_shrinks_the_estimate(doc in arb_json(), n in 0usize..16) {
        let before = total(&doc);
        let mut grown = doc;
        let mut index = n;
        if grow_nth_string(&mut grown, &mut index) {
            prop_assert_eq!(total(&grown), before + 1);
        } else {
            prop_assert_eq!(total(&grown), before);
        }
    }

    #[test]
    fn shared_subtree_counted_once(doc in arb_json()) {
        let child = Value::from(doc);
        let single = estimate(&Value::from(vec![child.clone()])).unwrap();
        let both = Value::from(vec![child.clone(), child.clone()]);
        let shared = estimate(&both).unwrap();
        if child.node_id().is_some() {
            // Only the extra slot is added.
            prop_assert_eq!(shared.total, single.total + 1);
            prop_assert_eq!(shared.composites, single.composites);
        } else {
            // Leaves are counted at every occurrence; the brackets only once.
            prop_assert_eq!(shared.total + 2, 2 * single.total);
        }
    }

    #[test]
    fn route_agrees_with_estimate(doc in arb_json(), max in 0u64..512) {
        let value = Value::from(doc);
        let policy = ThresholdPolicy::new(max).unwrap();
        let route = DispatchSerializer::new(policy).route(&value);
        let estimate = estimate(&value).unwrap();
        prop_assert_eq!(route.estimate.total(), Some(estimate.total));
        let fast = route.backend == sizeguard::Backend::Fast;
        prop_assert_eq!(fast, policy.allows_fast(&estimate));
    }
}
