// handlers/mod.rs - Three access tiers
//
// Public (no token) → Protected (any valid token) → Elevated (super_admin token).
// Handlers take `AuthUser` or `SuperAdmin` as an extractor; the gate runs
// before any handler body does.

pub mod elevated;
pub mod protected;
pub mod public;
pub mod utils;
