// handlers/elevated/db/record.rs - GET/PUT/DELETE /admin/db/:collection/:id

use axum::extract::{Path, State};
use serde_json::{json, Value};
use tracing::info;

use crate::api::format::{timestamp, to_public};
use crate::database::store::strip_ids;
use crate::error::ApiError;
use crate::filter::validate_collection_name;
use crate::handlers::utils::object_body;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, SuperAdmin};
use crate::state::AppState;

pub async fn record_get(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    validate_collection_name(&collection)?;

    let document = state
        .store()
        .await?
        .find_one(&collection, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Document not found"))?;
    Ok(ApiResponse::success(to_public(document)))
}

/// Top-level fields in the body overwrite the stored ones; `_id` / `id` are ignored.
pub async fn record_put(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    Path((collection, id)): Path<(String, String)>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    validate_collection_name(&collection)?;

    let mut changes = strip_ids(object_body(body)?);
    changes.insert("updatedAt".to_string(), timestamp());

    let store = state.store().await?;
    if !store.update(&collection, &id, changes).await? {
        return Err(ApiError::not_found("Document not found"));
    }
    info!(collection = %collection, id = %id, by = %claims.user_id, "document updated");

    let document = store
        .find_one(&collection, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("Document not found"))?;
    Ok(ApiResponse::success(to_public(document)))
}

pub async fn record_delete(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    validate_collection_name(&collection)?;

    if !state.store().await?.delete(&collection, &id).await? {
        return Err(ApiError::not_found("Document not found"));
    }
    info!(collection = %collection, id = %id, by = %claims.user_id, "document deleted");

    Ok(ApiResponse::success(json!({ "message": "Document deleted successfully" })))
}
