//! JSON argument helpers for function and trait-based tools.
//!
//! ```rust
//! use ftooling::{parse_call_arguments, required_string};
//!
//! let args = parse_call_arguments(r#"{"query":"rust"}"#).expect("object should parse");
//! let query = required_string(&args, "query").expect("query should be present");
//! assert_eq!(query, "rust");
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

/// Parses the raw argument string a model attached to a call.
///
/// Models sometimes send an empty string for parameterless calls; that is
/// treated as an empty object.
pub fn parse_call_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(raw)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn as_object(args: &Value) -> Result<&Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::invalid_arguments("expected JSON object arguments"))
}

pub fn required_string(args: &Value, key: &str) -> Result<String, ToolError> {
    as_object(args)?
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}
