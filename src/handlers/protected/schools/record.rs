// handlers/protected/schools/record.rs - GET/PUT/DELETE /schools/:id

use axum::extract::{Path, State};
use serde_json::{json, Value};
use tracing::info;

use super::SCHOOLS_COLLECTION;
use crate::api::format::{timestamp, to_public};
use crate::auth::{Claims, Role};
use crate::database::store::strip_ids;
use crate::error::ApiError;
use crate::handlers::utils::object_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::state::AppState;

/// A school_admin only ever sees the school bound to their account.
/// Checked before anything else, whatever the method.
fn affiliated(auth: AuthUser, id: &str) -> Result<Claims, ApiError> {
    let claims = auth.0;
    if claims.role == Role::SchoolAdmin && claims.school_id.as_deref() != Some(id) {
        tracing::debug!(user_id = %claims.user_id, school_id = %id, "school outside caller's affiliation");
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(claims)
}

pub async fn school_get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    affiliated(auth, &id)?;

    let store = state.store().await?;
    let school = store
        .find_one(SCHOOLS_COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("School not found"))?;
    Ok(ApiResponse::success(to_public(school)))
}

pub async fn school_put(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let claims = affiliated(auth, &id)?;
    let claims = AuthUser(claims).require_role(&[Role::SuperAdmin])?;

    let mut changes = strip_ids(object_body(body)?);
    changes.insert("updatedAt".to_string(), timestamp());

    let store = state.store().await?;
    if !store.update(SCHOOLS_COLLECTION, &id, changes).await? {
        return Err(ApiError::not_found("School not found"));
    }
    info!(school_id = %id, by = %claims.user_id, "school updated");

    let school = store
        .find_one(SCHOOLS_COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::not_found("School not found"))?;
    Ok(ApiResponse::success(to_public(school)))
}

pub async fn school_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let claims = affiliated(auth, &id)?;
    let claims = AuthUser(claims).require_role(&[Role::SuperAdmin])?;

    let store = state.store().await?;
    if !store.delete(SCHOOLS_COLLECTION, &id).await? {
        return Err(ApiError::not_found("School not found"));
    }
    info!(school_id = %id, by = %claims.user_id, "school deleted");

    Ok(ApiResponse::success(json!({ "message": "School deleted successfully" })))
}
