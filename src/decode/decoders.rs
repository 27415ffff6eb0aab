//! Decoder implementations

use crate::error::{Error, Result};
use crate::types::Record;
use serde_json::Value;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder that pulls records out of a response with a records path
///
/// Paths with wildcards (`$.data[*]`, `$.Rows[*]`) go through JSONPath;
/// plain dotted paths (`$.data`, `$.result.items[0]`) are walked directly.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    /// JSONPath to extract records
    record_path: Option<String>,
}

impl JsonDecoder {
    /// Create a new JSON decoder that treats the whole body as the records
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON decoder with a record path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: Some(path.into()),
        }
    }

    /// The configured record path
    pub fn record_path(&self) -> Option<&str> {
        self.record_path.as_deref()
    }

    /// Extract the records of a decoded response body
    ///
    /// Every extracted item must be a JSON object.
    pub fn decode(&self, body: &Value) -> Result<Vec<Record>> {
        let path = self.record_path.as_deref().unwrap_or("$");

        self.extract_values(body)?
            .into_iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::Object(map) => Ok(map),
                other => Err(Error::RecordExtraction {
                    path: path.to_string(),
                    message: format!("expected an object, found {}", type_name(&other)),
                }),
            })
            .collect()
    }

    /// Parse a response body and extract its records
    pub fn decode_str(&self, body: &str) -> Result<Vec<Record>> {
        let value: Value = serde_json::from_str(body)?;
        self.decode(&value)
    }

    fn extract_values(&self, value: &Value) -> Result<Vec<Value>> {
        match &self.record_path {
            Some(path) => {
                if path.contains('*') || path.contains("..") || path.contains("[?") {
                    extract_with_jsonpath(value, path)
                } else {
                    match extract_simple_path(value, path) {
                        Some(Value::Array(arr)) => Ok(arr),
                        Some(v) => Ok(vec![v]),
                        None => Ok(vec![]),
                    }
                }
            }
            None => match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![value.clone()]),
            },
        }
    }
}

/// Walk a dotted path, with optional `[n]` / `[-n]` array indexing
fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix('$').unwrap_or(path);
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index = index_str.parse::<i64>().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_possible_wrap
            )]
            let idx = if index < 0 {
                arr.len().checked_sub(index.unsigned_abs() as usize)?
            } else {
                index as usize
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
