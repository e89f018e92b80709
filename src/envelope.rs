use serde_json::Value;
use tracing::warn;

use crate::error::FetchError;

/// Status-field value meaning the upstream call itself succeeded.
pub const SUCCESS_CODE: i64 = 200;

/// Validated top-level response structure, after payload extraction.
#[derive(Debug)]
pub struct ReportEnvelope {
    /// Ordered item records, in the ranking order the source provided.
    pub items: Vec<Value>,
    /// Server-supplied message text, if any.
    pub message: Option<String>,
    /// Raw update timestamp string, if the source reports one.
    pub update_time: Option<String>,
}

/// Validate a decoded JSON tree into a [`ReportEnvelope`].
///
/// Checks, in order: both required top-level keys are present, the status
/// field equals [`SUCCESS_CODE`], and the payload is an array (or a string
/// containing a JSON-encoded array, which gets a secondary decode). The
/// payload is never touched before the status check passes.
pub fn validate_envelope(raw: &Value) -> Result<ReportEnvelope, FetchError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| FetchError::Payload("response is not a JSON object".to_string()))?;

    let code = obj
        .get("code")
        .and_then(Value::as_i64)
        .ok_or(FetchError::MissingField("code"))?;
    let data = obj.get("data").ok_or(FetchError::MissingField("data"))?;

    let message = obj.get("msg").and_then(Value::as_str).map(str::to_string);

    if code != SUCCESS_CODE {
        return Err(FetchError::Upstream(
            message.unwrap_or_else(|| "未知错误".to_string()),
        ));
    }

    let items = match data {
        Value::Array(items) => items.clone(),
        // Some endpoints double-encode the item list as a JSON string.
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                return Err(FetchError::Payload(format!(
                    "string payload decoded to {} instead of an array",
                    type_name(&other)
                )));
            }
            Err(e) => {
                warn!(error = %e, "Secondary decode of string payload failed");
                return Err(FetchError::Payload(format!(
                    "string payload is not valid JSON: {e}"
                )));
            }
        },
        other => {
            return Err(FetchError::Payload(format!(
                "expected an array, got {}",
                type_name(other)
            )));
        }
    };

    let update_time = ["updateTime", "time"]
        .iter()
        .find_map(|key| obj.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(ReportEnvelope {
        items,
        message,
        update_time,
    })
}

/// Read a field as display text, accepting both JSON strings and numbers.
pub fn text_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Like [`text_field`], but falls back to a placeholder for absent fields.
pub fn text_field_or(item: &Value, key: &str, fallback: &str) -> String {
    text_field(item, key).unwrap_or_else(|| fallback.to_string())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
