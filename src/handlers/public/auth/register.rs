// handlers/public/auth/register.rs - POST /auth/register

use axum::extract::State;
use serde::Deserialize;
use tracing::info;

use crate::auth::gate::Session;
use crate::auth::{NewUser, Role};
use crate::error::ApiError;
use crate::handlers::utils::present;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/**
 * POST /auth/register - Create an account and sign it in
 *
 * Input:  `{ "name", "email", "password", "role"? }` (role defaults to school_admin)
 * Output: 201 `{ "token", "user" }` with `isOnboarded: false`
 *
 * An email that is already registered answers 400 "User already exists" and
 * leaves the stored account untouched.
 */
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> ApiResult<Session> {
    let (Some(name), Some(email), Some(password)) =
        (present(body.name), present(body.email), present(body.password))
    else {
        return Err(ApiError::bad_request("Name, email, and password are required"));
    };

    let role = match present(body.role) {
        None => Role::default(),
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|_| ApiError::bad_request(format!("Invalid role: {}", raw)))?,
    };

    let credentials = state.gate.credentials();
    if credentials.find_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User already exists"));
    }

    let user = credentials
        .create_user(NewUser {
            name,
            email,
            password,
            role,
        })
        .await?;
    info!(user_id = %user.id, role = %user.role, "user registered");

    let session = state.gate.session_for(&user)?;
    Ok(ApiResponse::created(session))
}

#[cfg(test)]
mod tests {
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn registers_school_admin_by_default() {
        let app = TestApp::new();
        let res = app
            .post(
                "/api/auth/register",
                None,
                json!({"name": "Jo", "email": "jo@x.com", "password": "secret123"}),
            )
            .await;

        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["user"]["role"], "school_admin");
        assert_eq!(res.body["user"]["isOnboarded"], false);
        assert!(res.body["user"].get("password").is_none());
        assert!(res.body["user"].get("schoolId").is_none());

        let claims = app.state.gate.codec().decode(res.body["token"].as_str().unwrap()).unwrap();
        assert_eq!(claims.user_id, res.body["user"]["id"].as_str().unwrap());
        assert!(claims.school_id.is_none());
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = TestApp::new();
        for body in [
            json!({"email": "jo@x.com", "password": "secret123"}),
            json!({"name": "Jo", "email": "", "password": "secret123"}),
            json!({"name": "Jo", "email": "jo@x.com"}),
        ] {
            let res = app.post("/api/auth/register", None, body).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert_eq!(res.message(), "Name, email, and password are required");
        }
    }

    #[tokio::test]
    async fn duplicate_email_leaves_account_untouched() {
        let app = TestApp::new();
        let first = app
            .post(
                "/api/auth/register",
                None,
                json!({"name": "Jo", "email": "jo@x.com", "password": "secret123"}),
            )
            .await;
        assert_eq!(first.status, StatusCode::CREATED);

        let again = app
            .post(
                "/api/auth/register",
                None,
                json!({"name": "Imposter", "email": "jo@x.com", "password": "other-pass", "role": "super_admin"}),
            )
            .await;
        assert_eq!(again.status, StatusCode::BAD_REQUEST);
        assert_eq!(again.message(), "User already exists");

        let stored = app
            .state
            .gate
            .credentials()
            .find_by_email("jo@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Jo");
        assert_eq!(stored.role, crate::auth::Role::SchoolAdmin);

        let login = app
            .post("/api/auth/login", None, json!({"email": "jo@x.com", "password": "secret123"}))
            .await;
        assert_eq!(login.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let app = TestApp::new();
        let res = app
            .post(
                "/api/auth/register",
                None,
                json!({"name": "Jo", "email": "jo@x.com", "password": "secret123", "role": "teacher"}),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
}
