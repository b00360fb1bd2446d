// handlers/protected/schools/collection.rs - GET/POST /schools

use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

use super::SCHOOLS_COLLECTION;
use crate::api::format::{into_document, timestamp, to_public, to_public_list};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::handlers::utils::{copy_fields, has_fields, object_body};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, SuperAdmin};
use crate::state::AppState;

const REQUIRED: &[&str] = &["name", "board", "adminContact"];
const OPTIONAL: &[&str] = &["address", "website", "description"];

pub async fn schools_get(State(state): State<AppState>, _admin: SuperAdmin) -> ApiResult<Vec<Value>> {
    let store = state.store().await?;
    let schools = store.find(SCHOOLS_COLLECTION, &FilterData::new()).await?;
    Ok(ApiResponse::success(to_public_list(schools)))
}

/// New schools start active with no students; callers cannot set either.
pub async fn schools_post(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let body = object_body(body)?;
    if !has_fields(&body, REQUIRED) {
        return Err(ApiError::bad_request("Name, board, and admin contact are required"));
    }

    let now = timestamp();
    let mut school = into_document(json!({
        "totalStudents": 0,
        "status": "active",
        "createdAt": now,
        "updatedAt": now,
    }));
    copy_fields(&body, &mut school, REQUIRED);
    copy_fields(&body, &mut school, OPTIONAL);

    let store = state.store().await?;
    let id = store.insert(SCHOOLS_COLLECTION, school).await?;
    info!(school_id = %id, by = %claims.user_id, "school created");

    let created = store
        .find_one(SCHOOLS_COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::internal("School insert", "created school not readable"))?;
    Ok(ApiResponse::created(to_public(created)))
}
