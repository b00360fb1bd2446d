use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::gate::authorize;
use crate::auth::{Claims, Role};
use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity decoded from a valid bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn claims(&self) -> &Claims {
        &self.0
    }

    /// Narrows to `allowed`, answering 403 otherwise.
    pub fn require_role(self, allowed: &[Role]) -> Result<Claims, ApiError> {
        Ok(authorize(self.0, allowed)?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = state.gate.require_authenticated(&parts.headers)?;
        Ok(AuthUser(claims))
    }
}

/// A caller holding the `super_admin` role.
#[derive(Clone, Debug)]
pub struct SuperAdmin(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for SuperAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = state.gate.require_role(&parts.headers, &[Role::SuperAdmin])?;
        Ok(SuperAdmin(claims))
    }
}
