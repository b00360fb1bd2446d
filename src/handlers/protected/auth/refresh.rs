// handlers/protected/auth/refresh.rs - POST /auth/refresh

use axum::extract::State;
use serde_json::{json, Value};

use super::current_user;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// Issues a new token from the stored user, picking up role or school changes.
pub async fn refresh_post(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Value> {
    let user = current_user(&state, &auth.claims().user_id).await?;
    let token = state.gate.codec().issue(&user.token_payload())?;
    Ok(ApiResponse::success(json!({ "token": token })))
}
