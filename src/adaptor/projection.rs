use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::FetchError;

/// Where the records and the total live in an endpoint's payload.
///
/// Admin endpoints answer `{ "<Name>": [...] | "<json text>", "Count": n }`;
/// lookup endpoints answer a bare array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub result_field: Option<String>,
    pub count_field: Option<String>,
}

impl Default for Projection {
    fn default() -> Self {
        Self::bare()
    }
}

impl Projection {
    pub fn named(result_field: impl Into<String>) -> Self {
        Self {
            result_field: Some(result_field.into()),
            count_field: Some("Count".to_string()),
        }
    }

    pub fn bare() -> Self {
        Self {
            result_field: None,
            count_field: None,
        }
    }

    pub fn without_count(mut self) -> Self {
        self.count_field = None;
        self
    }

    /// Pull typed records and the server-side total out of `payload`
    pub fn project<T: DeserializeOwned>(&self, payload: Value) -> Result<(Vec<T>, i64), FetchError> {
        match payload {
            Value::Null => Ok((Vec::new(), 0)),
            Value::Array(_) => {
                let records: Vec<T> = serde_json::from_value(payload)?;
                let count = records.len() as i64;
                Ok((records, count))
            }
            Value::Object(mut map) => {
                let field = self.result_field.as_deref().ok_or_else(|| FetchError::Shape {
                    field: "<payload>".to_string(),
                    message: "object payload but no result field configured".to_string(),
                })?;
                let raw = map
                    .remove(field)
                    .ok_or_else(|| FetchError::MissingField(field.to_string()))?;
                let records: Vec<T> = decode_records(field, raw)?;

                let count = match self.count_field.as_deref() {
                    Some(count_field) => {
                        let raw = map
                            .get(count_field)
                            .ok_or_else(|| FetchError::MissingField(count_field.to_string()))?;
                        decode_count(count_field, raw)?
                    }
                    None => records.len() as i64,
                };
                Ok((records, count))
            }
            other => Err(FetchError::Shape {
                field: "<payload>".to_string(),
                message: format!("expected object, array or null, got {}", type_name(&other)),
            }),
        }
    }
}

// The backend serializes record arrays into a string inside the envelope
fn decode_records<T: DeserializeOwned>(field: &str, raw: Value) -> Result<Vec<T>, FetchError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Vec::new()),
        Value::String(text) => Ok(serde_json::from_str(&text)?),
        Value::Array(_) => Ok(serde_json::from_value(raw)?),
        other => Err(FetchError::Shape {
            field: field.to_string(),
            message: format!("expected array or JSON text, got {}", type_name(&other)),
        }),
    }
}

fn decode_count(field: &str, raw: &Value) -> Result<i64, FetchError> {
    let count = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    count.ok_or_else(|| FetchError::Shape {
        field: field.to_string(),
        message: format!("expected integer count, got {}", raw),
    })
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
