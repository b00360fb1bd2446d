use std::sync::Arc;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::{AuthGate, CredentialStore, TokenCodec, TokenError};
use crate::config::AppConfig;
use crate::database::{Database, DocumentStore};
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Token codec setup failed: {0}")]
    Token(#[from] TokenError),

    #[error("Login decoy setup failed: {0}")]
    Password(#[from] PasswordError),
}

/// Shared handles every handler can reach through `State`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    /// Builds the state for `config`. The store connects on first use.
    pub fn new(config: AppConfig) -> Result<Self, StateError> {
        let db = Arc::new(Database::new(&config.database));
        Self::assemble(config, db)
    }

    /// Same as [`AppState::new`] but over an already open store.
    pub fn with_store(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, StateError> {
        Self::assemble(config, Arc::new(Database::with_store(store)))
    }

    fn assemble(config: AppConfig, db: Arc<Database>) -> Result<Self, StateError> {
        let codec = TokenCodec::new(&config.security.jwt_secret, config.security.jwt_expiry)?;
        let credentials = CredentialStore::new(db.clone(), config.security.bcrypt_cost)?;

        Ok(Self {
            gate: Arc::new(AuthGate::new(codec, credentials)),
            config: Arc::new(config),
            db,
        })
    }

    pub async fn store(&self) -> Result<Arc<dyn DocumentStore>, ApiError> {
        Ok(self.db.store().await?)
    }
}
