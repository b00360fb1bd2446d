use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::store::{new_id, strip_ids, with_id, Document, DocumentStore};
use crate::filter::FilterData;

// Every collection shares one JSONB table, keyed by (collection, id).
const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    seq        BIGSERIAL PRIMARY KEY,
    collection TEXT        NOT NULL,
    id         TEXT        NOT NULL,
    body       JSONB       NOT NULL,
    UNIQUE (collection, id)
)"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection)";

// $2: containment object, $3: optional search text (already LIKE-escaped)
const MATCH_CLAUSE: &str = "collection = $1 AND body @> $2 \
     AND ($3::text IS NULL OR EXISTS ( \
         SELECT 1 FROM jsonb_each_text(body) kv WHERE kv.value ILIKE '%' || $3 || '%'))";

/// Document store over PostgreSQL.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        sqlx::query(CREATE_INDEX).execute(&pool).await?;

        info!("Connected document store (postgres, max_connections={})", max_connections);
        Ok(Self { pool })
    }

    fn match_params(filter: &FilterData) -> (Value, Option<String>) {
        let containment = Value::Object(filter.where_clause.clone().unwrap_or_default());
        let search = filter.search.as_deref().map(escape_like);
        (containment, search)
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn collections(&self) -> Result<Vec<String>, DatabaseError> {
        let rows = sqlx::query("SELECT DISTINCT collection FROM documents ORDER BY collection")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("collection").map_err(DatabaseError::from))
            .collect()
    }

    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, DatabaseError> {
        let (containment, search) = Self::match_params(filter);
        let sql = format!(
            "SELECT id, body FROM documents WHERE {} ORDER BY seq LIMIT $4 OFFSET $5",
            MATCH_CLAUSE
        );

        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(containment)
            .bind(search)
            .bind(filter.limit.map(i64::from))
            .bind(i64::from(filter.offset.unwrap_or(0)))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_document).collect()
    }

    async fn count(&self, collection: &str, filter: &FilterData) -> Result<u64, DatabaseError> {
        let (containment, search) = Self::match_params(filter);
        let sql = format!("SELECT COUNT(*) AS total FROM documents WHERE {}", MATCH_CLAUSE);

        let row = sqlx::query(&sql)
            .bind(collection)
            .bind(containment)
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError> {
        let row = sqlx::query("SELECT id, body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<String, DatabaseError> {
        let id = new_id();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(strip_ids(document)))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(strip_ids(changes)))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, DatabaseError> {
    let id: String = row.try_get("id")?;
    let body: Value = row.try_get("body")?;
    match body {
        Value::Object(map) => Ok(with_id(&id, map)),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(with_id(&id, map))
        }
    }
}

/// Escapes LIKE metacharacters so search text matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
