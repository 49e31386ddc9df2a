//! Deep cloning of engine-delivered data
//!
//! Values, keys and records handed to a native listener are backed by memory
//! the engine reclaims the moment the listener returns. Listener signatures
//! therefore take borrowed references, and this module is the one escape
//! hatch: it produces owned, fully independent copies for anything that must
//! outlive the call.
//!
//! Invariant: a clone shares no ownership with its source. Mutating or
//! destroying the source never affects the clone.

use kestrel_core::{Key, Record, Value};

/// Deep-copy a value.
///
/// Scalars copy by value; `Bytes` into freshly allocated storage of the same
/// length; `List`/`Map` rebuild the container by cloning every child,
/// preserving order and the map's declared ordering mode.
pub fn clone_value(value: &Value) -> Value {
    match value {
        Value::Nil => Value::Nil,
        Value::Bool(b) => Value::Bool(*b),
        Value::Int(i) => Value::Int(*i),
        Value::Double(f) => Value::Double(*f),
        Value::String(s) => Value::String(s.clone()),
        Value::Bytes(b) => {
            let mut copy = Vec::with_capacity(b.len());
            copy.extend_from_slice(b);
            Value::Bytes(copy)
        }
        Value::List(items) => Value::List(items.iter().map(clone_value).collect()),
        Value::Map { entries, order } => Value::Map {
            entries: entries
                .iter()
                .map(|(k, v)| (clone_value(k), clone_value(v)))
                .collect(),
            order: *order,
        },
        Value::GeoJson(s) => Value::GeoJson(s.clone()),
    }
}

/// Deep-copy a key, handling the value/digest duality.
///
/// A digest-only key clones the digest bytes; a value-carrying key clones
/// the user value and copies the already-computed digest rather than
/// rehashing.
pub fn clone_key(key: &Key) -> Key {
    Key {
        namespace: key.namespace.clone(),
        set: key.set.clone(),
        user_value: key.user_value.as_ref().map(clone_value),
        digest: key.digest,
    }
}

/// Deep-copy a record: metadata scalars, every bin's value, and the
/// embedded key.
pub fn clone_record(record: &Record) -> Record {
    Record {
        key: clone_key(&record.key),
        generation: record.generation,
        ttl: record.ttl,
        bins: record
            .bins
            .iter()
            .map(|(name, value)| (name.clone(), clone_value(value)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::MapOrder;
    use proptest::prelude::*;

    fn sample_key() -> Key {
        Key::new("test", Some("demo"), Value::String("k".into())).unwrap()
    }

    fn sample_record() -> Record {
        let mut rec = Record::new(sample_key());
        rec.generation = 3;
        rec.ttl = 600;
        rec.set_bin("s", Value::String("hello".into())).unwrap();
        rec.set_bin("b", Value::Bytes(vec![1, 2, 3])).unwrap();
        rec.set_bin(
            "m",
            Value::Map {
                entries: vec![(Value::Int(1), Value::List(vec![Value::Nil]))],
                order: MapOrder::KeyOrdered,
            },
        )
        .unwrap();
        rec
    }

    #[test]
    fn test_clone_value_deep_equal() {
        let original = Value::List(vec![
            Value::Bytes(vec![9, 8]),
            Value::map(vec![(Value::String("k".into()), Value::Double(1.5))]),
        ]);
        assert_eq!(clone_value(&original), original);
    }

    #[test]
    fn test_clone_survives_source_drop() {
        let source = sample_record();
        let copy = clone_record(&source);
        drop(source);
        assert_eq!(copy.bin("s"), Some(&Value::String("hello".into())));
        assert_eq!(copy.bin("b"), Some(&Value::Bytes(vec![1, 2, 3])));
    }

    #[test]
    fn test_mutating_clone_leaves_source_untouched() {
        let source = sample_record();
        let mut copy = clone_record(&source);
        copy.set_bin("s", Value::Int(0)).unwrap();
        if let Some(Value::Bytes(b)) = copy.bins.iter_mut().find(|(n, _)| n == "b").map(|(_, v)| v)
        {
            b[0] = 99;
        }
        assert_eq!(source.bin("s"), Some(&Value::String("hello".into())));
        assert_eq!(source.bin("b"), Some(&Value::Bytes(vec![1, 2, 3])));
    }

    #[test]
    fn test_clone_preserves_map_order_mode() {
        let map = Value::Map {
            entries: vec![(Value::Int(2), Value::Nil), (Value::Int(1), Value::Nil)],
            order: MapOrder::KeyValueOrdered,
        };
        let copy = clone_value(&map);
        match copy {
            Value::Map { entries, order } => {
                assert_eq!(order, MapOrder::KeyValueOrdered);
                assert_eq!(entries[0].0, Value::Int(2));
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_clone_key_with_value_keeps_digest() {
        let key = sample_key();
        let copy = clone_key(&key);
        assert_eq!(copy.digest(), key.digest());
        assert_eq!(copy.user_value, key.user_value);
    }

    #[test]
    fn test_clone_digest_only_key() {
        let key = Key::from_digest("test", None, [5u8; kestrel_core::DIGEST_LEN]).unwrap();
        let copy = clone_key(&key);
        assert_eq!(copy.digest(), key.digest());
        assert!(copy.user_value.is_none());
    }

    #[test]
    fn test_clone_record_metadata() {
        let rec = sample_record();
        let copy = clone_record(&rec);
        assert_eq!(copy.generation, 3);
        assert_eq!(copy.ttl, 600);
        assert_eq!(copy.len(), rec.len());
    }

    fn arbitrary_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Nil),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            // Finite doubles only so deep-equality holds
            (-1e9f64..1e9).prop_map(Value::Double),
            ".{0,8}".prop_map(Value::String),
            proptest::collection::vec(any::<u8>(), 0..12).prop_map(Value::Bytes),
        ];
        leaf.prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                proptest::collection::vec((inner.clone(), inner), 0..4)
                    .prop_map(|entries| Value::Map {
                        entries,
                        order: MapOrder::Unordered,
                    }),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_clone_is_deep_equal(value in arbitrary_value()) {
            prop_assert_eq!(clone_value(&value), value);
        }
    }
}
