// handlers/elevated/mod.rs - Elevated handlers (super_admin token required)
//
// Raw access to every collection in the document store. Every handler takes
// `SuperAdmin`, so a school_admin token is turned away before any storage call.

pub mod db;
