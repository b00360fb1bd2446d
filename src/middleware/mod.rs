pub mod auth;
pub mod cors;
pub mod response;

pub use auth::{AuthUser, SuperAdmin};
pub use cors::cors_middleware;
pub use response::{method_not_allowed, ApiResponse, ApiResult, JsonBody, QueryParams};
