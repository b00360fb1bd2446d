use axum::http::{header::AUTHORIZATION, HeaderMap};
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::credentials::{CredentialError, CredentialStore, PublicUser, UserRecord};
use crate::auth::{Claims, Role, TokenCodec, TokenError};

/// Why the gate turned a request away.
///
/// `InvalidToken` and `ExpiredToken` are kept apart for diagnostics; at the
/// HTTP boundary both read as "Authentication required".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token issuance failed: {0}")]
    Issue(TokenError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => AuthError::InvalidToken,
            TokenError::ExpiredToken => AuthError::ExpiredToken,
            other => AuthError::Issue(other),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// The one choke point every protected handler goes through.
pub struct AuthGate {
    codec: TokenCodec,
    credentials: CredentialStore,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, credentials: CredentialStore) -> Self {
        Self { codec, credentials }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.credentials.find_by_email(email).await?;
        let valid = self.credentials.check(user.as_ref(), password).await?;

        match user {
            Some(user) if valid => {
                info!(user_id = %user.id, role = %user.role, "login succeeded");
                self.session_for(&user)
            }
            _ => {
                debug!("login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Mints a token for `user` and pairs it with the public profile.
    pub fn session_for(&self, user: &UserRecord) -> Result<Session, AuthError> {
        let token = self.codec.issue(&user.token_payload())?;
        Ok(Session {
            token,
            user: user.public(),
        })
    }

    pub fn require_authenticated(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::AuthenticationRequired)?;
        self.codec.decode(token).map_err(|e| {
            debug!(reason = %e, "bearer token rejected");
            AuthError::from(e)
        })
    }

    pub fn require_role(&self, headers: &HeaderMap, allowed: &[Role]) -> Result<Claims, AuthError> {
        let claims = self.require_authenticated(headers)?;
        authorize(claims, allowed)
    }
}

/// Returns the claims unchanged when their role is in `allowed`.
pub fn authorize(claims: Claims, allowed: &[Role]) -> Result<Claims, AuthError> {
    if allowed.contains(&claims.role) {
        Ok(claims)
    } else {
        debug!(user_id = %claims.user_id, role = %claims.role, "role not permitted");
        Err(AuthError::InsufficientPermissions)
    }
}

/// The credential after a literal `Bearer ` prefix, if there is a non-empty one.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.trim().is_empty() {
        None
    } else {
        Some(token)
    }
}
