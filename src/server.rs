use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{cors_middleware, method_not_allowed};
use crate::state::AppState;

const GET: &[&str] = &["GET"];
const POST: &[&str] = &["POST"];
const GET_POST: &[&str] = &["GET", "POST"];
const GET_PUT_DELETE: &[&str] = &["GET", "PUT", "DELETE"];

/// The full application: every route under the configured base path, with
/// CORS and request tracing around all of it.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .merge(public_routes())
        .merge(account_routes())
        .merge(school_routes())
        .merge(student_routes())
        .merge(insight_routes())
        .merge(admin_routes());

    let base_path = normalize_base_path(&state.config.api.base_path);
    let router = match base_path {
        Some(base) => Router::new().nest(&base, routes),
        None => routes,
    };

    router
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `None` mounts at the root.
fn normalize_base_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{}", trimmed))
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/health", get(public::health::health_get).fallback(method_not_allowed(GET)))
        .route("/auth/login", post(auth::login_post).fallback(method_not_allowed(POST)))
        .route("/auth/register", post(auth::register_post).fallback(method_not_allowed(POST)))
        .route("/auth/logout", post(auth::logout_post).fallback(method_not_allowed(POST)))
}

fn account_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/auth/me", get(auth::me_get).fallback(method_not_allowed(GET)))
        .route("/auth/onboarding", post(auth::onboarding_post).fallback(method_not_allowed(POST)))
        .route("/auth/refresh", post(auth::refresh_post).fallback(method_not_allowed(POST)))
}

fn school_routes() -> Router<AppState> {
    use protected::schools;

    Router::new()
        .route(
            "/schools",
            get(schools::schools_get)
                .post(schools::schools_post)
                .fallback(method_not_allowed(GET_POST)),
        )
        .route(
            "/schools/stats",
            get(schools::school_stats_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/schools/:id",
            get(schools::school_get)
                .put(schools::school_put)
                .delete(schools::school_delete)
                .fallback(method_not_allowed(GET_PUT_DELETE)),
        )
}

fn student_routes() -> Router<AppState> {
    use protected::students;

    Router::new()
        .route(
            "/students",
            get(students::students_get)
                .post(students::students_post)
                .fallback(method_not_allowed(GET_POST)),
        )
        .route(
            "/students/stats/overview",
            get(students::students_overview_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/students/:id",
            get(students::student_get)
                .put(students::student_put)
                .delete(students::student_delete)
                .fallback(method_not_allowed(GET_PUT_DELETE)),
        )
        .route(
            "/students/:id/performance",
            get(students::student_performance_get).fallback(method_not_allowed(GET)),
        )
}

fn insight_routes() -> Router<AppState> {
    use protected::{analytics, leaderboard};

    Router::new()
        .route(
            "/analytics/dashboard",
            get(analytics::dashboard_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/analytics/performance/distribution",
            get(analytics::distribution_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/analytics/performance/skills",
            get(analytics::skills_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/analytics/schools/top-performing",
            get(analytics::top_schools_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/leaderboard/students/top",
            get(leaderboard::top_students_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/leaderboard/students/:id/rank",
            get(leaderboard::student_rank_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/leaderboard/classes/:class_name",
            get(leaderboard::class_leaderboard_get).fallback(method_not_allowed(GET)),
        )
}

fn admin_routes() -> Router<AppState> {
    use elevated::db;

    Router::new()
        .route(
            "/admin/db/collections",
            get(db::collections_get).fallback(method_not_allowed(GET)),
        )
        .route(
            "/admin/db/:collection",
            get(db::collection_get)
                .post(db::collection_post)
                .fallback(method_not_allowed(GET_POST)),
        )
        .route(
            "/admin/db/:collection/:id",
            get(db::record_get)
                .put(db::record_put)
                .delete(db::record_delete)
                .fallback(method_not_allowed(GET_PUT_DELETE)),
        )
}
