use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::database::manager::DatabaseError;
use crate::filter::FilterData;

/// A stored document. Documents returned by a store carry their storage key in `_id`.
pub type Document = Map<String, Value>;

/// Storage-assigned identifier field.
pub const ID_FIELD: &str = "_id";

/// Named collections of schemaless JSON documents.
///
/// Every method is a single storage-level operation; nothing here spans calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of every collection that holds or has held documents, sorted.
    async fn collections(&self) -> Result<Vec<String>, DatabaseError>;

    /// Documents matching `filter`, in insertion order, honoring its limit/offset.
    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, DatabaseError>;

    /// Number of documents matching `filter`, ignoring its paging window.
    async fn count(&self, collection: &str, filter: &FilterData) -> Result<u64, DatabaseError>;

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError>;

    /// Stores `document` under a fresh id and returns that id. Any `_id` in the input is ignored.
    async fn insert(&self, collection: &str, document: Document) -> Result<String, DatabaseError>;

    /// Overwrites the top-level fields in `changes`. Returns whether a document matched.
    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<bool, DatabaseError>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;

    /// First document matching `filter`.
    async fn find_first(&self, collection: &str, filter: FilterData) -> Result<Option<Document>, DatabaseError> {
        Ok(self.find(collection, &filter.limit(1)).await?.into_iter().next())
    }
}

/// Attaches the storage key to a body read back from a store.
pub(crate) fn with_id(id: &str, mut body: Document) -> Document {
    body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    body
}

/// Removes the identifier fields a caller must not be able to write.
pub(crate) fn strip_ids(mut body: Document) -> Document {
    body.remove(ID_FIELD);
    body.remove("id");
    body
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
