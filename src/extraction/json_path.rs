//! JSON path resolution.
//!
//! Resolves dot-notation paths like "data.body.trace.frames" inside an encoded
//! payload tree.

use serde_json::Value;

/// Resolve a dot-notation path to a value in JSON.
///
/// # Examples
/// ```
/// use faultwire_core::extraction::resolve_json_path;
/// use serde_json::json;
/// let data = json!({"data": {"body": {"message": {"body": "hi"}}}});
/// let value = resolve_json_path(&data, "data.body.message.body");
/// assert_eq!(value, Some(&json!("hi")));
/// ```
pub fn resolve_json_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(data);
    }

    let mut current = data;
    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(part)?,
            // "body.trace_chain.0.frames"
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`resolve_json_path`].
pub fn resolve_json_path_mut<'a>(data: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(data);
    }

    let mut current = data;
    for part in path.split('.') {
        current = match current {
            Value::Object(obj) => obj.get_mut(part)?,
            Value::Array(arr) => arr.get_mut(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable access to the array at `path`, if there is one.
pub fn array_at_mut<'a>(data: &'a mut Value, path: &str) -> Option<&'a mut Vec<Value>> {
    resolve_json_path_mut(data, path).and_then(Value::as_array_mut)
}
