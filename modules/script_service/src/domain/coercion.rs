//! Type coercion for loosely-typed field values in edit operations
//!
//! Clients send field updates as JSON values of whatever type the UI had at
//! hand ("1500", 1500, 1500.0). These helpers turn them into column types.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Value could not be converted to the column type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {found}")]
pub struct CoercionError {
    pub expected: &'static str,
    pub found: String,
}

impl CoercionError {
    fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.to_string(),
        }
    }
}

/// Accepts booleans, "true"/"false" (any case) and 0/1
pub fn coerce_bool(value: &Value) -> Result<bool, CoercionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(CoercionError::new("boolean", value)),
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(CoercionError::new("boolean", value)),
        },
        _ => Err(CoercionError::new("boolean", value)),
    }
}

/// Accepts integers, integral floats and numeric strings
pub fn coerce_i64(value: &Value) -> Result<i64, CoercionError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| CoercionError::new("integer", value)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| CoercionError::new("integer", value)),
        _ => Err(CoercionError::new("integer", value)),
    }
}

pub fn coerce_i32(value: &Value) -> Result<i32, CoercionError> {
    coerce_i64(value).and_then(|v| i32::try_from(v).map_err(|_| CoercionError::new("32-bit integer", value)))
}

/// Strings verbatim; numbers and booleans are stringified
pub fn coerce_string(value: &Value) -> Result<String, CoercionError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(CoercionError::new("string", value)),
    }
}

pub fn coerce_uuid(value: &Value) -> Result<Uuid, CoercionError> {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .ok_or_else(|| CoercionError::new("uuid", value))
}

/// RFC 3339 timestamps
pub fn coerce_datetime(value: &Value) -> Result<DateTime<Utc>, CoercionError> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoercionError::new("RFC 3339 timestamp", value))
}
