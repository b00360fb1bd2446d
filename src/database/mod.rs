pub mod manager;
pub mod memory;
pub mod postgres;
pub mod store;

pub use manager::{Database, DatabaseError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{Document, DocumentStore, ID_FIELD};
