use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Hashes on the blocking pool; bcrypt at cost 12 takes a noticeable slice of a second.
pub async fn hash_password(plain: String, cost: u32) -> Result<String, PasswordError> {
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hashed)
}

/// A hash that fails to parse verifies as `false`.
pub async fn verify_password(plain: String, hash: String) -> Result<bool, PasswordError> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false)).await?;
    Ok(ok)
}

/// Stand-in hash verified when no account exists, so an unknown email costs the
/// same bcrypt round as a wrong password. Hashed once, up front.
#[derive(Debug, Clone)]
pub struct DecoyHash {
    hash: Arc<str>,
}

impl DecoyHash {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let hash = bcrypt::hash(uuid::Uuid::new_v4().to_string(), cost)?;
        Ok(Self { hash: hash.into() })
    }

    /// Runs a full verification against the decoy and always reports a mismatch.
    pub async fn burn(&self, plain: String) -> Result<bool, PasswordError> {
        let hash = Arc::clone(&self.hash);
        tokio::task::spawn_blocking(move || {
            let _ = bcrypt::verify(plain, &hash);
        })
        .await?;
        Ok(false)
    }
}
