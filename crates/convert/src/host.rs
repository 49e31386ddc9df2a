//! The host runtime's dynamic value model
//!
//! [`HostValue`] mirrors what a dynamically-typed host hands the bridge:
//! nulls and undefined, IEEE double numbers, explicit big integers, strings,
//! byte buffers, arrays and insertion-ordered objects. It is the only shape
//! user callbacks ever see; the engine-facing [`kestrel_core::Value`] model
//! never leaks past the converter.

use base64::Engine as _;

/// Prefix marking a base64-encoded buffer inside a JSON string, used by the
/// serde_json interop so buffers survive a trip through JSON.
const BYTES_PREFIX: &str = "__bytes__:";

/// A host-side dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// Host null.
    Null,
    /// Host undefined. Valid only as an output (degraded server data maps
    /// here); using it as an input is a parameter error.
    Undefined,
    /// Boolean.
    Bool(bool),
    /// IEEE-754 double — the host's one number type.
    Number(f64),
    /// A number explicitly tagged as floating by the host, so an integral
    /// value like `2.0` stays a double through the converter instead of
    /// collapsing to an integer.
    Float(f64),
    /// Explicit big integer, used when a value exceeds the host's
    /// safe-integer range.
    BigInt(i128),
    /// UTF-8 string.
    String(String),
    /// Byte buffer.
    Buffer(Vec<u8>),
    /// Array of values.
    List(Vec<HostValue>),
    /// Object with string keys, insertion order preserved.
    Object(Vec<(String, HostValue)>),
    /// GeoJSON document in textual form.
    GeoJson(String),
}

impl HostValue {
    /// Variant name as a static string.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "Null",
            HostValue::Undefined => "Undefined",
            HostValue::Bool(_) => "Bool",
            HostValue::Number(_) => "Number",
            HostValue::Float(_) => "Float",
            HostValue::BigInt(_) => "BigInt",
            HostValue::String(_) => "String",
            HostValue::Buffer(_) => "Buffer",
            HostValue::List(_) => "List",
            HostValue::Object(_) => "Object",
            HostValue::GeoJson(_) => "GeoJson",
        }
    }

    /// True for `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    /// Get as f64 if this is a Number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) | HostValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as &str if this is a String.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Look up an object field by name.
    pub fn field(&self, name: &str) -> Option<&HostValue> {
        match self {
            HostValue::Object(fields) => {
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
            }
            _ => None,
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Number(i as f64)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(b: Vec<u8>) -> Self {
        HostValue::Buffer(b)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(l: Vec<HostValue>) -> Self {
        HostValue::List(l)
    }
}

// ============================================================================
// serde_json interop
// ============================================================================

impl From<serde_json::Value> for HostValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            serde_json::Value::Number(n) => {
                HostValue::Number(n.as_f64().unwrap_or(0.0))
            }
            serde_json::Value::String(s) => {
                if let Some(encoded) = s.strip_prefix(BYTES_PREFIX) {
                    match base64::engine::general_purpose::STANDARD.decode(encoded) {
                        Ok(bytes) => HostValue::Buffer(bytes),
                        Err(_) => HostValue::String(s),
                    }
                } else {
                    HostValue::String(s)
                }
            }
            serde_json::Value::Array(arr) => {
                HostValue::List(arr.into_iter().map(HostValue::from).collect())
            }
            serde_json::Value::Object(obj) => {
                HostValue::Object(obj.into_iter().map(|(k, v)| (k, HostValue::from(v))).collect())
            }
        }
    }
}

impl From<HostValue> for serde_json::Value {
    fn from(v: HostValue) -> Self {
        match v {
            // JSON has no undefined; both absent variants collapse to null
            HostValue::Null | HostValue::Undefined => serde_json::Value::Null,
            HostValue::Bool(b) => serde_json::Value::Bool(b),
            HostValue::Number(n) | HostValue::Float(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            HostValue::BigInt(i) => {
                if let Ok(small) = i64::try_from(i) {
                    serde_json::Value::Number(small.into())
                } else {
                    serde_json::Value::String(i.to_string())
                }
            }
            HostValue::String(s) => serde_json::Value::String(s),
            HostValue::Buffer(b) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&b);
                serde_json::Value::String(format!("{}{}", BYTES_PREFIX, encoded))
            }
            HostValue::List(l) => {
                serde_json::Value::Array(l.into_iter().map(serde_json::Value::from).collect())
            }
            HostValue::Object(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            HostValue::GeoJson(s) => {
                serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(HostValue::Null.type_name(), "Null");
        assert_eq!(HostValue::Undefined.type_name(), "Undefined");
        assert_eq!(HostValue::Number(1.0).type_name(), "Number");
        assert_eq!(HostValue::BigInt(1).type_name(), "BigInt");
    }

    #[test]
    fn test_field_lookup() {
        let obj = HostValue::Object(vec![
            ("a".into(), HostValue::Number(1.0)),
            ("b".into(), HostValue::Null),
        ]);
        assert_eq!(obj.field("a"), Some(&HostValue::Number(1.0)));
        assert_eq!(obj.field("c"), None);
        assert_eq!(HostValue::Null.field("a"), None);
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(HostValue::from("x"), HostValue::String("x".into()));
        assert_eq!(HostValue::from(true), HostValue::Bool(true));
        assert_eq!(HostValue::from(3i64), HostValue::Number(3.0));
        assert_eq!(HostValue::from(vec![1u8, 2]), HostValue::Buffer(vec![1, 2]));
    }

    #[test]
    fn test_json_buffer_roundtrip() {
        let original = HostValue::Buffer(vec![0, 1, 254, 255]);
        let json: serde_json::Value = original.clone().into();
        assert!(json.as_str().unwrap().starts_with(BYTES_PREFIX));
        let restored = HostValue::from(json);
        assert_eq!(original, restored);
    }

    #[test]
    fn test_json_object_roundtrip() {
        // Float literals: a host number always serializes back as a double.
        let json = serde_json::json!({"a": [1.5, 2.5, "three"], "b": null});
        let v = HostValue::from(json.clone());
        assert!(matches!(v, HostValue::Object(_)));
        let back: serde_json::Value = v.into();
        assert_eq!(back, json);
    }

    #[test]
    fn test_undefined_becomes_json_null() {
        let json: serde_json::Value = HostValue::Undefined.into();
        assert!(json.is_null());
    }

    #[test]
    fn test_nan_becomes_json_null() {
        let json: serde_json::Value = HostValue::Number(f64::NAN).into();
        assert!(json.is_null());
    }

    #[test]
    fn test_bigint_to_json() {
        let json: serde_json::Value = HostValue::BigInt(1 << 60).into();
        assert_eq!(json, serde_json::json!(1i64 << 60));
        // Outside i64 falls back to a string
        let json: serde_json::Value = HostValue::BigInt(i128::from(i64::MAX) + 1).into();
        assert!(json.is_string());
    }
}
