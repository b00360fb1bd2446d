// handlers/public/auth/logout.rs - POST /auth/logout
//
// Tokens are stateless and not revoked; clients drop theirs.

use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};

pub async fn logout_post() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "message": "Logged out successfully" })))
}
