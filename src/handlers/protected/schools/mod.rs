// handlers/protected/schools/mod.rs - /schools
//
// Listing, creating and stats are super_admin only. A single school is
// readable by super_admins and by the school_admin bound to it; only
// super_admins may change or remove it.

pub mod collection;
pub mod record;
pub mod stats;

pub use collection::{schools_get, schools_post};
pub use record::{school_delete, school_get, school_put};
pub use stats::school_stats_get;

pub const SCHOOLS_COLLECTION: &str = "schools";
