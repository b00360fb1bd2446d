// handlers/protected/auth/mod.rs - Account endpoints for signed-in users

pub mod me;
pub mod onboarding;
pub mod refresh;

pub use me::me_get;
pub use onboarding::onboarding_post;
pub use refresh::refresh_post;

use crate::auth::UserRecord;
use crate::error::ApiError;
use crate::state::AppState;

/// Loads the account behind a token. Tokens can outlive their user.
pub(crate) async fn current_user(state: &AppState, user_id: &str) -> Result<UserRecord, ApiError> {
    state
        .gate
        .credentials()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}
