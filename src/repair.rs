//! Repair of double-encoded JSON strings.
//!
//! The JSON API sometimes takes bytes that are already UTF-8, decodes them
//! as a single-byte Western charset and escapes the result, so `"für"`
//! arrives as `"fÃ¼r"`. Narrowing every UTF-16 code unit back to
//! one byte and decoding those bytes as UTF-8 undoes that.

use serde_json::{Map, Value};

/// Repairs every string leaf of `value`, keeping shape and key order.
pub fn repair(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(repair_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(repair).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, repair(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

pub fn repair_str(s: &str) -> String {
    if s.is_ascii() {
        return s.to_string();
    }
    let bytes: Vec<u8> = s.encode_utf16().map(|unit| unit as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
