use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::database::{Document, ID_FIELD};

/// Fields that never leave the server, whatever collection they sit in.
const HIDDEN_FIELDS: &[&str] = &["password"];

/// Converts a stored document into the public wire format: the storage `_id`
/// becomes `id` and hidden fields are dropped.
pub fn to_public(mut document: Document) -> Value {
    let id = document.remove(ID_FIELD);
    for field in HIDDEN_FIELDS {
        document.remove(*field);
    }

    let mut out = Map::with_capacity(document.len() + 1);
    if let Some(id) = id {
        out.insert("id".to_string(), id);
    }
    out.extend(document);
    Value::Object(out)
}

pub fn to_public_list(documents: Vec<Document>) -> Vec<Value> {
    documents.into_iter().map(to_public).collect()
}

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Object bodies pass through; anything else becomes an empty document.
pub fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Reads a dotted path such as `performance.xpPoints` as a number.
pub fn number_at(document: &Document, path: &str) -> Option<f64> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.get(segment)?;
    }
    current.as_f64()
}
