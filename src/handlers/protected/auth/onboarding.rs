// handlers/protected/auth/onboarding.rs - POST /auth/onboarding

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::current_user;
use crate::api::format::{into_document, timestamp, to_public};
use crate::error::ApiError;
use crate::handlers::protected::schools::SCHOOLS_COLLECTION;
use crate::handlers::utils::present;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub school_name: Option<String>,
    pub board: Option<String>,
    pub admin_name: Option<String>,
    pub admin_email: Option<String>,
    pub admin_phone: Option<String>,
    #[serde(default)]
    pub school_address: Option<Value>,
    pub website: Option<String>,
    pub description: Option<String>,
}

/**
 * POST /auth/onboarding - Create the caller's school and bind the account to it
 *
 * Output: `{ "token", "user", "school" }`. The token is reissued so it
 * carries the new `schoolId`.
 */
pub async fn onboarding_post(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<OnboardingRequest>,
) -> ApiResult<Value> {
    let (Some(school_name), Some(board), Some(admin_name), Some(admin_email), Some(admin_phone)) = (
        present(body.school_name),
        present(body.board),
        present(body.admin_name),
        present(body.admin_email),
        present(body.admin_phone),
    ) else {
        return Err(ApiError::bad_request(
            "School name, board, and admin contact details are required",
        ));
    };

    let user = current_user(&state, &auth.claims().user_id).await?;
    if user.is_onboarded {
        return Err(ApiError::bad_request("Onboarding already completed"));
    }

    let now = timestamp();
    let mut school = into_document(json!({
        "name": school_name,
        "board": board,
        "adminContact": {
            "name": admin_name,
            "email": admin_email,
            "phone": admin_phone,
        },
        "totalStudents": 0,
        "status": "active",
        "createdAt": now,
        "updatedAt": now,
    }));
    if let Some(address) = body.school_address.filter(|v| !v.is_null()) {
        school.insert("address".to_string(), address);
    }
    if let Some(website) = present(body.website) {
        school.insert("website".to_string(), Value::String(website));
    }
    if let Some(description) = present(body.description) {
        school.insert("description".to_string(), Value::String(description));
    }

    let store = state.store().await?;
    let school_id = store.insert(SCHOOLS_COLLECTION, school).await?;

    let credentials = state.gate.credentials();
    if !credentials.complete_onboarding(&user.id, &school_id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id = %user.id, school_id = %school_id, "onboarding completed");

    let user = current_user(&state, &user.id).await?;
    let session = state.gate.session_for(&user)?;
    let school = store
        .find_one(SCHOOLS_COLLECTION, &school_id)
        .await?
        .map(to_public)
        .unwrap_or(Value::Null);

    Ok(ApiResponse::success(json!({
        "token": session.token,
        "user": session.user,
        "school": school,
    })))
}
