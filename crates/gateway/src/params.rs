//! Typed extraction of operation arguments from `serde_json::Value`.
//!
//! Every malformed or missing argument surfaces as `BAD_USER_INPUT` here,
//! before any upstream call is attempted.

use serde_json::Value;

use crate::error::GatewayError;

/// Extract a trimmed, non-empty `&str` field.
///
/// Returns `None` when the key is absent, null, not a string, empty, or
/// whitespace-only.
pub fn str_param<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Like [`str_param`] but required.
pub fn require_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, GatewayError> {
    str_param(params, key)
        .ok_or_else(|| GatewayError::bad_input(format!("missing required argument: {key}")))
}

/// Extract an optional non-negative integer. Present-but-malformed is an
/// input error rather than a silent default.
pub fn opt_u64_param(params: &Value, key: &str) -> Result<Option<u64>, GatewayError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| GatewayError::bad_input(format!("{key} must be a non-negative integer"))),
    }
}

/// Extract an optional boolean, same strictness as [`opt_u64_param`].
pub fn opt_bool_param(params: &Value, key: &str) -> Result<Option<bool>, GatewayError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| GatewayError::bad_input(format!("{key} must be a boolean"))),
    }
}

/// Extract a required JSON object field (mutation `input` payloads).
pub fn require_object<'a>(params: &'a Value, key: &str) -> Result<&'a Value, GatewayError> {
    match params.get(key) {
        Some(value) if value.is_object() => Ok(value),
        Some(_) => Err(GatewayError::bad_input(format!("{key} must be an object"))),
        None => Err(GatewayError::bad_input(format!(
            "missing required argument: {key}"
        ))),
    }
}
