//! Lenient readers for provider JSON
//!
//! Both map services drift between API versions: ids arrive as numbers or
//! strings, fields move or disappear, and "missing" is spelled as null, 0 or
//! an empty string depending on the endpoint. These helpers give every module
//! the same reading rules.

use serde_json::{Map, Value};

/// Read an integer, tolerating the shapes providers actually send
///
/// - Integers are returned as-is
/// - Floats are truncated toward zero
/// - Strings holding a base-10 integer (surrounding whitespace allowed) are parsed
/// - Everything else (null, bool, fractional strings, arrays, objects) is `None`
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else if let Some(f) = n.as_f64() {
                let truncated = f.trunc();
                if truncated.is_finite()
                    && truncated >= i64::MIN as f64
                    && truncated <= i64::MAX as f64
                {
                    Some(truncated as i64)
                } else {
                    None
                }
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Whether a value counts as "present"
///
/// Null, false, zero, empty strings and empty containers are all treated as
/// absent, so lookups can fall through to the next candidate field.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First present value among `keys`, in order
pub fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| is_present(v))
}

/// Non-empty string at `key`
pub fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Non-empty string at `outer.inner`
pub fn nested_str<'a>(obj: &'a Map<String, Value>, outer: &str, inner: &str) -> Option<&'a str> {
    obj.get(outer)
        .and_then(Value::as_object)
        .and_then(|o| str_field(o, inner))
}

/// Integer at `key`, if present and numeric
pub fn int_field(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key).and_then(as_i64)
}

/// Array of items under the first present key among `keys`
///
/// Missing keys or non-array values yield an empty slice.
pub fn items<'a>(body: &'a Value, keys: &[&str]) -> &'a [Value] {
    body.as_object()
        .and_then(|obj| first_present(obj, keys))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
