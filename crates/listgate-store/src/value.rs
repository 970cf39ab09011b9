//! JSON value to wire-text coercion.
//!
//! Every item property crosses the wire as text. The conversion is
//! deliberately lossy and total: whatever the source system put in a
//! field, it becomes a string here, and the same input always yields
//! the same output.

use serde_json::Value;

/// Render a JSON value as the text the store receives.
///
/// - strings pass through unchanged
/// - numbers use their canonical JSON rendering
/// - booleans become lowercase `"true"` / `"false"`
/// - null becomes the empty string
/// - arrays and objects are serialized as compact JSON
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_pass_through() {
        assert_eq!(coerce_to_string(&json!("plain")), "plain");
        assert_eq!(coerce_to_string(&json!("")), "");
    }

    #[test]
    fn integers_and_floats_render_canonically() {
        assert_eq!(coerce_to_string(&json!(42)), "42");
        assert_eq!(coerce_to_string(&json!(-7)), "-7");
        assert_eq!(coerce_to_string(&json!(3.5)), "3.5");
        assert_eq!(coerce_to_string(&json!(0)), "0");
    }

    #[test]
    fn booleans_are_lowercase() {
        assert_eq!(coerce_to_string(&json!(true)), "true");
        assert_eq!(coerce_to_string(&json!(false)), "false");
    }

    #[test]
    fn null_is_empty() {
        assert_eq!(coerce_to_string(&Value::Null), "");
    }

    #[test]
    fn date_like_strings_are_untouched() {
        // Timestamps arrive as strings and must not be reformatted.
        assert_eq!(
            coerce_to_string(&json!("2024-06-01T12:00:00Z")),
            "2024-06-01T12:00:00Z"
        );
    }

    #[test]
    fn compound_values_become_compact_json() {
        assert_eq!(coerce_to_string(&json!([1, "a"])), r#"[1,"a"]"#);
        assert_eq!(coerce_to_string(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
