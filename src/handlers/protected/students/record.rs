// handlers/protected/students/record.rs - /students/:id and /students/:id/performance

use axum::extract::{Path, State};
use serde_json::{json, Value};
use tracing::info;

use super::STUDENTS_COLLECTION;
use crate::api::format::{timestamp, to_public};
use crate::database::store::strip_ids;
use crate::database::Document;
use crate::error::ApiError;
use crate::handlers::utils::object_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, SuperAdmin};
use crate::state::AppState;

async fn load(state: &AppState, id: &str) -> Result<Document, ApiError> {
    state
        .store()
        .await?
        .find_one(STUDENTS_COLLECTION, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))
}

pub async fn student_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    Ok(ApiResponse::success(to_public(load(&state, &id).await?)))
}

pub async fn student_performance_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let mut student = load(&state, &id).await?;
    let performance = student
        .remove("performance")
        .filter(Value::is_object)
        .unwrap_or_else(|| json!({}));
    Ok(ApiResponse::success(performance))
}

pub async fn student_put(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    let mut changes = strip_ids(object_body(body)?);
    changes.insert("updatedAt".to_string(), timestamp());

    let store = state.store().await?;
    if !store.update(STUDENTS_COLLECTION, &id, changes).await? {
        return Err(ApiError::not_found("Student not found"));
    }
    info!(student_id = %id, by = %claims.user_id, "student updated");

    Ok(ApiResponse::success(to_public(load(&state, &id).await?)))
}

pub async fn student_delete(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let store = state.store().await?;
    if !store.delete(STUDENTS_COLLECTION, &id).await? {
        return Err(ApiError::not_found("Student not found"));
    }
    info!(student_id = %id, by = %claims.user_id, "student deleted");

    Ok(ApiResponse::success(json!({ "message": "Student deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use crate::auth::Role;
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn asha(app: &TestApp) -> String {
        app.insert(
            "students",
            json!({
                "name": "Asha",
                "class": "10",
                "schoolId": "school-a",
                "performance": {"xpPoints": 40, "accuracyPercentage": 81},
            }),
        )
        .await
    }

    #[tokio::test]
    async fn super_admin_updates_then_deletes() {
        let app = TestApp::new();
        let id = asha(&app).await;
        let token = app.super_admin().await;
        let path = format!("/api/students/{}", id);

        let updated = app
            .put(&path, Some(&token), json!({"class": "11", "_id": "hijack"}))
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["id"], id.as_str());
        assert_eq!(updated.body["class"], "11");
        assert_eq!(updated.body["name"], "Asha");
        assert!(updated.body["updatedAt"].is_string());

        let performance = app.get(&format!("{}/performance", path), Some(&token)).await;
        assert_eq!(performance.body["xpPoints"], 40);

        let deleted = app.delete(&path, Some(&token)).await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(deleted.message(), "Student deleted successfully");

        let gone = app.get(&path, Some(&token)).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
        assert_eq!(gone.message(), "Student not found");
    }

    #[tokio::test]
    async fn school_admin_cannot_write() {
        let app = TestApp::new();
        let id = asha(&app).await;
        let token = app.school_admin_of("school-a").await;
        let path = format!("/api/students/{}", id);

        let put = app.put(&path, Some(&token), json!({"class": "12"})).await;
        assert_eq!(put.status, StatusCode::FORBIDDEN);
        assert_eq!(put.message(), "Insufficient permissions");

        let delete = app.delete(&path, Some(&token)).await;
        assert_eq!(delete.status, StatusCode::FORBIDDEN);

        // Reads stay open and the record is untouched
        let read = app.get(&path, Some(&token)).await;
        assert_eq!(read.status, StatusCode::OK);
        assert_eq!(read.body["class"], "10");
    }

    #[tokio::test]
    async fn missing_student_is_404_for_every_method() {
        let app = TestApp::new();
        let token = app.super_admin().await;

        let put = app
            .put("/api/students/no-such-id", Some(&token), json!({"class": "12"}))
            .await;
        assert_eq!(put.status, StatusCode::NOT_FOUND);
        assert_eq!(put.message(), "Student not found");

        let delete = app.delete("/api/students/no-such-id", Some(&token)).await;
        assert_eq!(delete.status, StatusCode::NOT_FOUND);

        let (other, _) = app.user(Role::SchoolAdmin).await;
        let read = app.get("/api/students/no-such-id", Some(&other)).await;
        assert_eq!(read.status, StatusCode::NOT_FOUND);
    }
}
