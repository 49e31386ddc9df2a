//! Bidirectional conversion between host values and the native value model
//!
//! ## Numeric rules
//!
//! - A host `Number` with a fractional part (or any non-finite value) maps to
//!   `Double`; an integral `Number` within the safe-integer range maps to
//!   `Int`.
//! - A host value explicitly tagged as floating ([`HostValue::Float`]) always
//!   maps to `Double`.
//! - `BigInt` maps to `Int`, and conversion fails loudly when the value does
//!   not fit in 64 bits — the converter never truncates.
//! - Going native→host, an `Int` whose magnitude exceeds the host
//!   safe-integer range becomes `BigInt` rather than silently losing
//!   precision; an integral `Double` comes back as the tagged `Float` so it
//!   stays a double.
//!
//! ## Round trip
//!
//! `to_host(to_native(v))` is deep-equal to `v` for all host values, with
//! two documented normalizations: a fractional `Float` comes back as the
//! untagged `Number` (on the host both are the same double), and a `BigInt`
//! within the safe range comes back as `Number` (no precision is at stake).

use kestrel_core::{BridgeError, MapOrder, Result, Value};

use crate::host::HostValue;

/// Largest integer the host's double-based number type represents exactly
/// (2^53 − 1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Smallest exactly-representable host integer (−(2^53 − 1)).
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

/// Convert a host value into the native value model.
///
/// Copy semantics throughout: buffers are copied, never borrowed, because
/// the source buffer's lifetime is not guaranteed past this call.
pub fn to_native(value: &HostValue) -> Result<Value> {
    match value {
        HostValue::Null => Ok(Value::Nil),
        HostValue::Undefined => Err(BridgeError::param(
            "undefined is not a valid bin or key value",
        )),
        HostValue::Bool(b) => Ok(Value::Bool(*b)),
        HostValue::Number(n) => {
            if n.is_finite()
                && n.fract() == 0.0
                && *n >= MIN_SAFE_INTEGER as f64
                && *n <= MAX_SAFE_INTEGER as f64
            {
                Ok(Value::Int(*n as i64))
            } else {
                Ok(Value::Double(*n))
            }
        }
        HostValue::Float(f) => Ok(Value::Double(*f)),
        HostValue::BigInt(i) => match i64::try_from(*i) {
            Ok(v) => Ok(Value::Int(v)),
            Err(_) => Err(BridgeError::param(format!(
                "integer {} does not fit in 64 bits",
                i
            ))),
        },
        HostValue::String(s) => Ok(Value::String(s.clone())),
        HostValue::Buffer(b) => Ok(Value::Bytes(b.clone())),
        HostValue::List(items) => {
            let converted: Result<Vec<Value>> = items.iter().map(to_native).collect();
            Ok(Value::List(converted?))
        }
        HostValue::Object(fields) => {
            let mut entries = Vec::with_capacity(fields.len());
            for (name, field) in fields {
                entries.push((Value::String(name.clone()), to_native(field)?));
            }
            Ok(Value::Map {
                entries,
                order: MapOrder::Unordered,
            })
        }
        HostValue::GeoJson(s) => Ok(Value::GeoJson(s.clone())),
    }
}

/// Convert a native value back into the host model.
///
/// This direction is total: values that cannot be represented faithfully
/// degrade (`Undefined` is the designated degraded form) instead of raising,
/// since they can appear in partial server responses.
pub fn to_host(value: &Value) -> HostValue {
    match value {
        Value::Nil => HostValue::Null,
        Value::Bool(b) => HostValue::Bool(*b),
        Value::Int(i) => {
            if *i >= MIN_SAFE_INTEGER && *i <= MAX_SAFE_INTEGER {
                HostValue::Number(*i as f64)
            } else {
                HostValue::BigInt(*i as i128)
            }
        }
        Value::Double(f) => {
            if f.is_finite() && f.fract() == 0.0 {
                HostValue::Float(*f)
            } else {
                HostValue::Number(*f)
            }
        }
        Value::String(s) => HostValue::String(s.clone()),
        Value::Bytes(b) => HostValue::Buffer(b.clone()),
        Value::List(items) => HostValue::List(items.iter().map(to_host).collect()),
        Value::Map { entries, .. } => {
            // Host objects have string keys; non-stringable keys drop their
            // entry rather than failing the whole record.
            let mut fields = Vec::with_capacity(entries.len());
            for (key, entry) in entries {
                if let Some(name) = map_key_to_string(key) {
                    fields.push((name, to_host(entry)));
                }
            }
            HostValue::Object(fields)
        }
        Value::GeoJson(s) => HostValue::GeoJson(s.clone()),
    }
}

fn map_key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
