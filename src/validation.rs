//! Tool argument validation.
//!
//! Deliberately minimal: the arguments must be an object, every `required`
//! key must be present, and `additionalProperties: false` object schemas
//! reject unknown keys. Types, formats and nested schemas are left to the
//! upstream.

use crate::types::{Error, Result};
use serde_json::Value;

/// Validate `args` against a tool's input schema.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<()> {
    let args = args.as_object().ok_or(Error::InvalidArguments)?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !args.contains_key(key) {
                return Err(Error::MissingRequiredArgument(key.to_string()));
            }
        }
    }

    let is_object_schema = schema.get("type").and_then(Value::as_str) == Some("object");
    let forbids_extras = schema.get("additionalProperties") == Some(&Value::Bool(false));

    if is_object_schema && forbids_extras {
        let properties = schema.get("properties").and_then(Value::as_object);
        let mut extras: Vec<String> = args
            .keys()
            .filter(|key| properties.map_or(true, |props| !props.contains_key(key.as_str())))
            .cloned()
            .collect();
        if !extras.is_empty() {
            extras.sort();
            return Err(Error::DisallowedArguments(extras));
        }
    }

    Ok(())
}
