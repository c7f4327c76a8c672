//! Positional argument access for helpers.

use fm_core::HelperError;
use serde_json::Value;

/// String argument at `index`. Numbers and booleans are converted.
pub(crate) fn string(
    helper: &'static str,
    args: &[Value],
    index: usize,
) -> Result<String, HelperError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(value.to_string()),
        Some(other) => Err(HelperError::InvalidArgument {
            helper,
            message: format!("argument {} must be a string, got {other}", index + 1),
        }),
        None => Err(HelperError::InvalidArgument {
            helper,
            message: format!("argument {} is required", index + 1),
        }),
    }
}

/// Optional object argument at `index`. `null` counts as absent.
pub(crate) fn object<'a>(
    helper: &'static str,
    args: &'a [Value],
    index: usize,
) -> Result<Option<&'a serde_json::Map<String, Value>>, HelperError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(HelperError::InvalidArgument {
            helper,
            message: format!("argument {} must be an object, got {other}", index + 1),
        }),
    }
}

/// Text form of a value for substitution into strings.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_accepts_numbers() {
        assert_eq!(string("meta", &[json!(42)], 0).unwrap(), "42");
    }

    #[test]
    fn test_string_missing() {
        let err = string("meta", &[], 1).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument for meta(): argument 2 is required");
    }

    #[test]
    fn test_object_rejects_strings() {
        assert!(object("__", &[json!("x"), json!("y")], 1).is_err());
        assert!(object("__", &[json!("x")], 1).unwrap().is_none());
    }
}
