use serde_json::Value;

/// Renders a JSON value as a flat string.
///
/// Strings are taken verbatim; every other value (numbers, booleans,
/// arrays, objects) becomes its compact JSON text. The mapping is lossy
/// but deterministic for a given input.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Returns the value only when it carries data; JSON `null` counts as absent.
pub fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify(&json!("abc")), "abc");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(true)), "true");
    }

    #[test]
    fn test_stringify_nested() {
        assert_eq!(stringify(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
        assert_eq!(stringify(&json!(["x", null])), r#"["x",null]"#);
    }

    #[test]
    fn test_non_null() {
        let null = json!(null);
        let one = json!(1);
        assert!(non_null(Some(&null)).is_none());
        assert!(non_null(None).is_none());
        assert_eq!(non_null(Some(&one)), Some(&one));
    }
}
