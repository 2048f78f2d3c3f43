//! Decoding of the argument string a model attaches to a tool call.
//!
//! Models sometimes send an empty string, or `null`, for tools that take no
//! input; both decode to an empty object.
//!
//! ```rust
//! use ftooling::decode_arguments;
//!
//! let args = decode_arguments(r#"{"petId":7}"#).expect("object should decode");
//! assert_eq!(args["petId"], 7);
//!
//! assert!(decode_arguments("  ").expect("blank is empty").is_empty());
//! assert!(decode_arguments("[1]").is_err());
//! ```

use serde_json::Value;

use crate::{ToolArgs, ToolError};

pub fn decode_arguments(raw: &str) -> Result<ToolArgs, ToolError> {
    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|err| ToolError::invalid_arguments(format!("arguments are not JSON: {err}")))?;

    match value {
        Value::Object(args) => Ok(args),
        Value::Null => Ok(ToolArgs::new()),
        other => Err(ToolError::invalid_arguments(format!(
            "arguments must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
