//! Argument extraction helpers for local tools.
//!
//! ```rust
//! use ltooling::{argument_object, optional_string, required_string};
//! use serde_json::json;
//!
//! let value = json!({ "action": "get", "key": "favorite_team" });
//! let args = argument_object(&value).expect("object should parse");
//! assert_eq!(required_string(args, "action").expect("action"), "get");
//! assert_eq!(optional_string(args, "missing"), None);
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn argument_object(arguments: &Value) -> Result<&Map<String, Value>, ToolError> {
    arguments
        .as_object()
        .ok_or_else(|| ToolError::invalid_arguments("expected JSON object arguments"))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Map<String, Value>, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn required_string_reports_missing_key() {
        let value = json!({ "key": 7 });
        let args = argument_object(&value).expect("object");
        let error = required_string(args, "key").expect_err("non-string key");
        assert_eq!(error.kind, crate::ToolErrorKind::InvalidArguments);
        assert!(error.message.contains("required"));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let error = argument_object(&json!([1, 2])).expect_err("array is not an object");
        assert_eq!(error.kind, crate::ToolErrorKind::InvalidArguments);
        assert!(parse_json_value("{").is_err());
    }
}
