//! Helpers for interpreting loosely typed RPC results.

use serde_json::Value;

/// Truthiness the way the Odoo server (Python) sees it: `null`, `false`, zero,
/// and empty strings, arrays and objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn falsy_values() {
        for v in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for v in [json!(true), json!(7), json!(-1), json!("x"), json!([0]), json!({"a": 1})] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }
}
