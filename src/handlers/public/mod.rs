// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness only; inputs here are entirely untrusted.

pub mod auth;
pub mod health;
