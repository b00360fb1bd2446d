// handlers/elevated/db/collections.rs - GET /admin/db/collections

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, SuperAdmin};
use crate::state::AppState;

pub async fn collections_get(State(state): State<AppState>, _admin: SuperAdmin) -> ApiResult<Value> {
    let collections = state.store().await?.collections().await?;
    Ok(ApiResponse::success(json!({ "collections": collections })))
}
