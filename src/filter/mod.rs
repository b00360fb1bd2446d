use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Invalid where clause: {0}")]
    InvalidWhereClause(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
}

/// Selection applied to a single collection.
///
/// `where_clause` is a containment match: every key it names must be present in
/// the document with an equal (or, for nested objects/arrays, contained) value.
/// `search` is a case-insensitive substring match against the top-level values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterData {
    pub where_clause: Option<Map<String, Value>>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl FilterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.where_clause
            .get_or_insert_with(Map::new)
            .insert(field.to_string(), value.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        self.search = if trimmed.is_empty() { None } else { Some(trimmed.to_string()) };
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Evaluates the selection against a document body (paging is the caller's job).
    pub fn matches(&self, body: &Map<String, Value>) -> bool {
        if let Some(clause) = &self.where_clause {
            for (key, expected) in clause {
                match body.get(key) {
                    Some(actual) if contains(actual, expected) => {}
                    _ => return false,
                }
            }
        }

        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let hit = body.values().any(|v| search_text(v).to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Parses the `where` query parameter. It must be a JSON object.
pub fn parse_where(raw: &str) -> Result<Map<String, Value>, FilterError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FilterError::InvalidWhereClause("expected a JSON object".to_string())),
        Err(e) => Err(FilterError::InvalidWhereClause(e.to_string())),
    }
}

/// Page window from the raw `page` / `limit` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Result<Self, FilterError> {
        let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) | Err(_) => return Err(FilterError::InvalidPage(raw.to_string())),
                Ok(n) => n,
            },
        };

        let limit = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            None => default_limit,
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) | Err(_) => return Err(FilterError::InvalidLimit(raw.to_string())),
                Ok(n) => n,
            },
        };

        Ok(Self {
            page,
            limit: limit.min(max_limit),
        })
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn apply(&self, filter: FilterData) -> FilterData {
        filter.limit(self.limit).offset(self.offset())
    }
}

/// Collection names are used as storage keys; keep them to a safe alphabet.
pub fn validate_collection_name(name: &str) -> Result<(), FilterError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidCollection(name.to_string()))
    }
}

/// JSON containment, mirroring PostgreSQL `jsonb @>`.
pub fn contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| a.get(k).map(|av| contains(av, ev)).unwrap_or(false)),
        (Value::Array(a), Value::Array(e)) => e.iter().all(|ev| a.iter().any(|av| contains(av, ev))),
        // jsonb: an array contains a bare scalar it holds
        (Value::Array(a), scalar) if !scalar.is_object() => a.iter().any(|av| av == scalar),
        (Value::Number(a), Value::Number(e)) => a.as_f64() == e.as_f64(),
        (a, e) => a == e,
    }
}

/// Text form of a value as `jsonb_each_text` renders it.
fn search_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
