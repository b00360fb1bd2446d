// handlers/protected/students/collection.rs - GET/POST /students

use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

use super::{StudentQuery, STUDENTS_COLLECTION};
use crate::api::format::{timestamp, to_public, to_public_list};
use crate::database::store::strip_ids;
use crate::error::ApiError;
use crate::handlers::utils::{has_fields, object_body};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, QueryParams, SuperAdmin};
use crate::state::AppState;

const REQUIRED: &[&str] = &["name", "class", "schoolId"];

pub async fn students_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(query): QueryParams<StudentQuery>,
) -> ApiResult<Vec<Value>> {
    let store = state.store().await?;
    let students = store.find(STUDENTS_COLLECTION, &query.filter()).await?;
    Ok(ApiResponse::success(to_public_list(students)))
}

/// Unknown fields are kept; `enrollmentDate` and an empty `performance` are
/// filled in when the caller leaves them out.
pub async fn students_post(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let mut student = strip_ids(object_body(body)?);
    if !has_fields(&student, REQUIRED) {
        return Err(ApiError::bad_request("Name, class, and schoolId are required"));
    }

    let now = timestamp();
    student.entry("enrollmentDate").or_insert_with(|| now.clone());
    student.entry("performance").or_insert_with(empty_performance);
    student.insert("createdAt".to_string(), now.clone());
    student.insert("updatedAt".to_string(), now);

    let store = state.store().await?;
    let id = store.insert(STUDENTS_COLLECTION, student).await?;
    info!(student_id = %id, by = %claims.user_id, "student created");

    let created = store
        .find_one(STUDENTS_COLLECTION, &id)
        .await?
        .ok_or_else(|| ApiError::internal("Student insert", "created student not readable"))?;
    Ok(ApiResponse::created(to_public(created)))
}

fn empty_performance() -> Value {
    json!({
        "accuracyPercentage": 0,
        "lessonsCompleted": 0,
        "timeSpentMinutes": 0,
        "xpPoints": 0,
    })
}
