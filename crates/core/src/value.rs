//! Value types for Kestrel
//!
//! This module defines [`Value`], the tagged union carried in record bins and
//! key user values. All layers of the bridge speak this model; the host-side
//! dynamic model lives in `kestrel-convert`.
//!
//! ## Type rules
//!
//! - Nine variants only: Nil, Bool, Int, Double, String, Bytes, List, Map,
//!   GeoJson
//! - No implicit coercions: `Int(1) != Double(1.0)`
//! - `Bytes` are not `String`
//! - Double uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - Map preserves insertion order and carries its declared ordering mode
//!
//! Containers own their children exclusively. Sharing structure between two
//! values only happens through an explicit clone.

use serde::{Deserialize, Serialize};

/// Declared ordering mode of a [`Value::Map`].
///
/// The mode travels with the map through cloning and conversion; the entry
/// vector itself always preserves insertion order regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapOrder {
    /// No server-side ordering requested.
    Unordered,
    /// Ordered by key.
    KeyOrdered,
    /// Ordered by key, then value.
    KeyValueOrdered,
}

impl Default for MapOrder {
    fn default() -> Self {
        MapOrder::Unordered
    }
}

/// Canonical bridge value type.
///
/// ## Type equality
///
/// Different variants are never equal, even when they contain the same
/// "value": `Int(1) != Double(1.0)`, `Bytes(b"x") != String("x")`.
/// Double equality follows IEEE-754 semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Absent / null value
    Nil,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754)
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Ordered list of values
    List(Vec<Value>),
    /// Map with arbitrary value keys, insertion order preserved
    Map {
        /// Entries in insertion order.
        entries: Vec<(Value, Value)>,
        /// Declared ordering mode.
        order: MapOrder,
    },
    /// GeoJSON document, carried as its textual form
    GeoJson(String),
}

// Custom PartialEq for IEEE-754 double semantics; the map ordering mode is
// part of the value and participates in equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (
                Value::Map { entries: a, order: ao },
                Value::Map { entries: b, order: bo },
            ) => ao == bo && a == b,
            (Value::GeoJson(a), Value::GeoJson(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Construct an unordered map from entries, preserving their order.
    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map {
            entries,
            order: MapOrder::Unordered,
        }
    }

    /// Get the variant name as a static string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::List(_) => "List",
            Value::Map { .. } => "Map",
            Value::GeoJson(_) => "GeoJson",
        }
    }

    /// Check if this is the nil value
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Check if this is a boolean value
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if this is an integer value
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Check if this is a double value
    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    /// Check if this is a string value
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if this is a bytes value
    pub fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    /// Check if this is a list value
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Check if this is a map value
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map { .. })
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Double value
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Bytes value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get as &[Value] if this is a List value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Get the entry slice if this is a Map value
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map { entries, .. } => Some(entries),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_nil() {
        let value = Value::Nil;
        assert!(value.is_nil());
        assert_eq!(value.type_name(), "Nil");
    }

    #[test]
    fn test_value_scalars() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::Int(-100).as_int(), Some(-100));
        assert_eq!(Value::String("hi".into()).as_str(), Some("hi"));
        assert_eq!(Value::Bytes(vec![1, 2]).as_bytes(), Some([1u8, 2].as_slice()));

        let d = Value::Double(3.5);
        assert_eq!(d.as_double(), Some(3.5));
    }

    #[test]
    fn test_value_list() {
        let list = Value::List(vec![Value::Int(1), Value::String("a".into())]);
        assert!(list.is_list());
        let items = list.as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Value::Int(1));
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let map = Value::map(vec![
            (Value::String("z".into()), Value::Int(1)),
            (Value::String("a".into()), Value::Int(2)),
            (Value::Int(7), Value::Bool(false)),
        ]);
        let entries = map.as_map().unwrap();
        assert_eq!(entries[0].0, Value::String("z".into()));
        assert_eq!(entries[1].0, Value::String("a".into()));
        assert_eq!(entries[2].0, Value::Int(7));
    }

    #[test]
    fn test_map_order_mode_participates_in_equality() {
        let a = Value::Map {
            entries: vec![(Value::Int(1), Value::Int(2))],
            order: MapOrder::Unordered,
        };
        let b = Value::Map {
            entries: vec![(Value::Int(1), Value::Int(2))],
            order: MapOrder::KeyOrdered,
        };
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_int_not_equal_double() {
        assert_ne!(Value::Int(1), Value::Double(1.0));
    }

    #[test]
    fn test_bytes_not_equal_string() {
        assert_ne!(Value::Bytes(b"hello".to_vec()), Value::String("hello".into()));
    }

    #[test]
    fn test_nan_not_equal_nan() {
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert_eq!(Value::Double(-0.0), Value::Double(0.0));
    }

    #[test]
    fn test_nil_not_equal_other_variants() {
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Nil, Value::Int(0));
        assert_ne!(Value::Nil, Value::String(String::new()));
    }

    #[test]
    fn test_geojson() {
        let g = Value::GeoJson(r#"{"type":"Point","coordinates":[1.0,2.0]}"#.into());
        assert_eq!(g.type_name(), "GeoJson");
        assert_eq!(g, g.clone());
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(42i64), Value::Int(42));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("x"), Value::String("x".into()));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Bytes(vec![1, 2]));
        assert_eq!(Value::from(()), Value::Nil);
        assert_eq!(
            Value::from(vec![Value::Int(1)]),
            Value::List(vec![Value::Int(1)])
        );
        assert!(matches!(Value::from(2.5f64), Value::Double(f) if f == 2.5));
    }

    #[test]
    fn test_serde_roundtrip_all_variants() {
        let values = vec![
            Value::Nil,
            Value::Bool(true),
            Value::Int(-7),
            Value::Double(1.25),
            Value::String("test".into()),
            Value::Bytes(vec![0, 255]),
            Value::List(vec![Value::Int(1), Value::Nil]),
            Value::Map {
                entries: vec![(Value::String("k".into()), Value::Int(9))],
                order: MapOrder::KeyOrdered,
            },
            Value::GeoJson("{}".into()),
        ];
        for value in values {
            let encoded = serde_json::to_string(&value).unwrap();
            let decoded: Value = serde_json::from_str(&encoded).unwrap();
            assert_eq!(value, decoded);
        }
    }

    #[test]
    fn test_nested_containers() {
        let inner = Value::map(vec![(Value::String("x".into()), Value::Int(1))]);
        let outer = Value::List(vec![inner.clone(), Value::Int(3)]);
        assert_eq!(outer.as_list().unwrap()[0], inner);
    }

    #[test]
    fn test_as_wrong_type_returns_none() {
        let v = Value::Int(42);
        assert!(v.as_bool().is_none());
        assert!(v.as_double().is_none());
        assert!(v.as_str().is_none());
        assert!(v.as_bytes().is_none());
        assert!(v.as_list().is_none());
        assert!(v.as_map().is_none());
    }
}
