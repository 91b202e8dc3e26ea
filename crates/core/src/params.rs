//! Typed lookups into a loose JSON config object.
//!
//! Missing keys (or `null`) fall back to the default. A key that is present
//! with the wrong JSON type is an error, so a typo'd value is reported rather
//! than silently ignored.

use serde_json::Value;

use crate::error::BackdropError;

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lookup<'a>(params: &'a Value, name: &str) -> Option<&'a Value> {
    params.get(name).filter(|v| !v.is_null())
}

fn mismatch(name: &str, expected: &str, got: &Value) -> BackdropError {
    BackdropError::ParamTypeMismatch {
        name: name.to_string(),
        expected: expected.to_string(),
        got: json_type(got).to_string(),
    }
}

/// Reads a number, accepting integers and floats.
pub fn param_f64(params: &Value, name: &str, default: f64) -> Result<f64, BackdropError> {
    match lookup(params, name) {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| mismatch(name, "number", v)),
    }
}

/// Reads a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> Result<usize, BackdropError> {
    match lookup(params, name) {
        None => Ok(default),
        Some(v) => v
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| mismatch(name, "non-negative integer", v)),
    }
}

/// Reads a string.
pub fn param_string(params: &Value, name: &str, default: &str) -> Result<String, BackdropError> {
    match lookup(params, name) {
        None => Ok(default.to_owned()),
        Some(v) => v
            .as_str()
            .map(String::from)
            .ok_or_else(|| mismatch(name, "string", v)),
    }
}
