// handlers/public/auth/login.rs - POST /auth/login

use axum::extract::State;
use serde::Deserialize;

use crate::auth::gate::Session;
use crate::error::ApiError;
use crate::handlers::utils::present;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/**
 * POST /auth/login - Exchange email and password for a session token
 *
 * Input:  `{ "email": "...", "password": "..." }`
 * Output: `{ "token": "eyJ...", "user": { "id", "email", "name", "role", "schoolId", "isOnboarded" } }`
 *
 * An unknown email and a wrong password both answer 401 "Invalid credentials".
 */
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<Session> {
    let (Some(email), Some(password)) = (present(body.email), present(body.password)) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let session = state.gate.login(&email, &password).await?;
    Ok(ApiResponse::success(session))
}
