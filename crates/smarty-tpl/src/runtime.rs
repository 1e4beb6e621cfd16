//! Reference semantics for the helpers the `isset` and `empty` filters
//! inline into compiled templates.
//!
//! The compiler only emits code; these functions evaluate the same checks
//! over JSON data, for renderers written in Rust and for verifying the
//! generated helpers' contracts.

use serde_json::Value;

/// Checks whether a dotted `path` exists below `root`.
///
/// The first segment of `path` names the root variable itself and is not
/// looked up. Every following segment is a property (or array index) of the
/// previous one. An absent or non-container intermediate yields `false`
/// rather than an error. The final segment only has to exist; its value may
/// be `null`. A single-segment path tests that the root is not `null`.
///
/// ```rust
/// use serde_json::json;
/// use smarty_tpl::runtime::isset;
///
/// let root = json!({"a": {"b": 1}});
/// assert!(isset(&root, "root.a.b"));
/// assert!(!isset(&root, "root.a.c"));
/// assert!(!isset(&root, "root.x.y"));
/// ```
pub fn isset(root: &Value, path: &str) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return !root.is_null();
    }

    let mut node = root;
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate().skip(1) {
        let child = match node {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => return false,
        };
        match child {
            Some(_) if i == last => return true,
            Some(value) => node = value,
            None => return false,
        }
    }
    false
}

/// Checks whether a value counts as empty.
///
/// Empty values are numeric zero, the strings `"0"` and `""`, `null`, and a
/// missing value. Everything else, including `false`, `{}` and `[]`, is not.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty() || s == "0",
        Some(_) => false,
    }
}
