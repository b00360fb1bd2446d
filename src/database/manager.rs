use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PostgresStore;
use crate::database::store::DocumentStore;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unsupported database scheme: {0}")]
    UnsupportedScheme(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Lazily-opened handle to the document store, owned by the application state.
///
/// The first caller opens the connection; later callers share it. No close or
/// reconnect is modeled.
pub struct Database {
    url: String,
    max_connections: u32,
    store: OnceCell<Arc<dyn DocumentStore>>,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            store: OnceCell::new(),
        }
    }

    /// Wraps an already-open store.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            url: String::new(),
            max_connections: 0,
            store: OnceCell::new_with(Some(store)),
        }
    }

    pub async fn store(&self) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        self.store
            .get_or_try_init(|| Self::open(&self.url, self.max_connections))
            .await
            .cloned()
    }

    async fn open(url: &str, max_connections: u32) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        if url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match parsed.scheme() {
            "memory" => {
                info!("Using in-memory document store");
                Ok(Arc::new(MemoryStore::new()))
            }
            "postgres" | "postgresql" => {
                let store = PostgresStore::connect(url, max_connections.max(1)).await?;
                Ok(Arc::new(store))
            }
            other => Err(DatabaseError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Opens the store if needed and pings it
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store().await?.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_connections: 1,
        }
    }

    #[tokio::test]
    async fn memory_url_opens_once_and_is_shared() {
        let db = Database::new(&config("memory://"));
        let a = db.store().await.unwrap();
        let b = db.store().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(db.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn missing_url_fails_on_first_use() {
        let db = Database::new(&config(""));
        assert!(matches!(db.store().await, Err(DatabaseError::ConfigMissing("DATABASE_URL"))));
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let db = Database::new(&config("mongodb://localhost/school"));
        assert!(matches!(db.store().await, Err(DatabaseError::UnsupportedScheme(s)) if s == "mongodb"));
    }
}
