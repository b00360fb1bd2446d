// handlers/elevated/db/mod.rs - /admin/db

pub mod collection;
pub mod collections;
pub mod record;

pub use collection::{collection_get, collection_post};
pub use collections::collections_get;
pub use record::{record_delete, record_get, record_put};
