use serde_json::Value;

use crate::database::Document;
use crate::error::ApiError;

/// A request field only counts when it is a non-empty string.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// True when every field in `fields` is set in `body`. Null and "" count as missing.
pub fn has_fields(body: &Document, fields: &[&str]) -> bool {
    fields.iter().all(|field| match body.get(*field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    })
}

/// Write endpoints take a JSON object and nothing else.
pub fn object_body(value: Value) -> Result<Document, ApiError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

/// Copies `fields` from `source` into `target` when they are set.
pub fn copy_fields(source: &Document, target: &mut Document, fields: &[&str]) {
    for field in fields {
        if let Some(value) = source.get(*field).filter(|v| !v.is_null()) {
            target.insert(field.to_string(), value.clone());
        }
    }
}
