// handlers/protected/auth/me.rs - GET /auth/me

use axum::extract::State;

use super::current_user;
use crate::auth::credentials::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// The caller's stored profile, read fresh rather than from the token.
pub async fn me_get(State(state): State<AppState>, auth: AuthUser) -> ApiResult<PublicUser> {
    let user = current_user(&state, &auth.claims().user_id).await?;
    Ok(ApiResponse::success(user.public()))
}
