// handlers/protected/mod.rs - Protected handlers (valid token required)
//
// Every handler here extracts `AuthUser` or `SuperAdmin`; per-resource role
// rules live with the handler that needs them.

pub mod analytics;
pub mod auth;
pub mod leaderboard;
pub mod schools;
pub mod students;
