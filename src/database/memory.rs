use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{new_id, strip_ids, with_id, Document, DocumentStore};
use crate::filter::FilterData;

/// In-process store selected by `memory://`. Contents live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<(String, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn collections(&self) -> Result<Vec<String>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections.keys().cloned().collect())
    }

    async fn find(&self, collection: &str, filter: &FilterData) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(docs
            .iter()
            .filter(|(_, body)| filter.matches(body))
            .skip(offset)
            .take(limit)
            .map(|(id, body)| with_id(id, body.clone()))
            .collect())
    }

    async fn count(&self, collection: &str, filter: &FilterData) -> Result<u64, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|(_, body)| filter.matches(body)).count() as u64)
            .unwrap_or(0))
    }

    async fn find_one(&self, collection: &str, id: &str) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(doc_id, body)| with_id(doc_id, body.clone())))
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<String, DatabaseError> {
        let id = new_id();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), strip_ids(document)));
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, changes: Document) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some((_, body)) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id))
        else {
            return Ok(false);
        };

        for (key, value) in strip_ids(changes) {
            body.insert(key, value);
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        Ok(docs.len() < before)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_ignores_client_ids() {
        let store = MemoryStore::new();
        let id = store
            .insert("schools", doc(json!({"_id": "forged", "id": "forged", "name": "North"})))
            .await
            .unwrap();

        assert_ne!(id, "forged");
        let found = store.find_one("schools", &id).await.unwrap().unwrap();
        assert_eq!(found["_id"], json!(id));
        assert_eq!(found["name"], "North");
        assert!(found.get("id").is_none());
        assert!(store.find_one("schools", "forged").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_pages_in_insertion_order() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.insert("students", doc(json!({"n": n, "schoolId": "A"}))).await.unwrap();
        }
        store.insert("students", doc(json!({"n": 99, "schoolId": "B"}))).await.unwrap();

        let filter = FilterData::new().where_eq("schoolId", "A");
        assert_eq!(store.count("students", &filter).await.unwrap(), 5);

        let page = store.find("students", &filter.clone().offset(2).limit(2)).await.unwrap();
        let ns: Vec<_> = page.iter().map(|d| d["n"].clone()).collect();
        assert_eq!(ns, vec![json!(2), json!(3)]);
    }

    #[tokio::test]
    async fn update_sets_fields_and_reports_match() {
        let store = MemoryStore::new();
        let id = store.insert("schools", doc(json!({"name": "Old", "status": "active"}))).await.unwrap();

        assert!(store.update("schools", &id, doc(json!({"name": "New", "_id": "x"}))).await.unwrap());
        let found = store.find_one("schools", &id).await.unwrap().unwrap();
        assert_eq!(found["name"], "New");
        assert_eq!(found["status"], "active");
        assert_eq!(found["_id"], json!(id));

        assert!(!store.update("schools", "nope", doc(json!({"name": "x"}))).await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let store = MemoryStore::new();
        let id = store.insert("schools", doc(json!({"name": "Gone"}))).await.unwrap();
        assert!(store.delete("schools", &id).await.unwrap());
        assert!(!store.delete("schools", &id).await.unwrap());
        assert!(!store.delete("nothing", &id).await.unwrap());
    }

    #[tokio::test]
    async fn collections_are_sorted_and_survive_emptying() {
        let store = MemoryStore::new();
        let id = store.insert("users", doc(json!({}))).await.unwrap();
        store.insert("schools", doc(json!({}))).await.unwrap();
        store.delete("users", &id).await.unwrap();

        assert_eq!(store.collections().await.unwrap(), vec!["schools", "users"]);
    }

    #[tokio::test]
    async fn find_first_uses_filter() {
        let store = MemoryStore::new();
        store.insert("users", doc(json!({"email": "a@x.com"}))).await.unwrap();
        store.insert("users", doc(json!({"email": "b@x.com"}))).await.unwrap();

        let hit = store
            .find_first("users", FilterData::new().where_eq("email", "b@x.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit["email"], "b@x.com");
        assert!(store
            .find_first("users", FilterData::new().where_eq("email", "B@x.com"))
            .await
            .unwrap()
            .is_none());
    }
}
