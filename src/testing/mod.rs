use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use crate::api::format::into_document;
use crate::auth::{NewUser, Role, UserRecord};
use crate::config::AppConfig;
use crate::database::MemoryStore;
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "secret123";

/// In-process application over a fresh memory store.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::for_store("test-secret", "memory://"))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::with_store(config, Arc::new(MemoryStore::new())).expect("test state");
        let router = crate::server::app(state.clone());
        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Stores a user with a unique email and returns a token for it.
    pub async fn user(&self, role: Role) -> (String, UserRecord) {
        let email = format!("user_{}@test.local", Uuid::new_v4().simple());
        let user = self
            .state
            .gate
            .credentials()
            .create_user(NewUser {
                name: "Test User".to_string(),
                email,
                password: TEST_PASSWORD.to_string(),
                role,
            })
            .await
            .expect("create user");
        let token = self.state.gate.session_for(&user).expect("session").token;
        (token, user)
    }

    pub async fn super_admin(&self) -> String {
        self.user(Role::SuperAdmin).await.0
    }

    /// A school_admin already onboarded to `school_id`.
    pub async fn school_admin_of(&self, school_id: &str) -> String {
        let (_, user) = self.user(Role::SchoolAdmin).await;
        let credentials = self.state.gate.credentials();
        credentials
            .complete_onboarding(&user.id, school_id)
            .await
            .expect("onboard");
        let user = credentials.find_by_id(&user.id).await.expect("reload").expect("user");
        self.state.gate.session_for(&user).expect("session").token
    }

    /// Inserts a raw document and returns its id.
    pub async fn insert(&self, collection: &str, document: Value) -> String {
        let store = self.state.store().await.expect("store");
        store
            .insert(collection, into_document(document))
            .await
            .expect("insert")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
