//! In-memory document store.
//!
//! Behaves like the `PostgreSQL` store (store-assigned identities, insertion
//! order, string equality filters) without any external process. Used for
//! local development (`CONTEST_STORE=memory`) and by the router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use contest_hub_core::{
    Collection, DeleteResult, Document, DocumentId, ID_FIELD, InsertOneResult, with_identity,
};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};

/// Process-local document store.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<(DocumentId, Document)>>>,
    online: AtomicBool,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the connection to the store.
    ///
    /// While offline every operation fails with [`StoreError::Unavailable`].
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ))
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| with_identity(*id, body.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| *doc_id == id)
                .map(|(doc_id, body)| with_identity(*doc_id, body.clone()))
        }))
    }

    async fn find_by_field(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, body)| {
                        matches!(body.get(field), Some(Value::String(s)) if s == value)
                    })
                    .map(|(id, body)| with_identity(*id, body.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, StoreError> {
        self.ensure_online()?;
        document.shift_remove(ID_FIELD);

        let id = DocumentId::generate();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .push((id, document));

        Ok(InsertOneResult::acknowledged(id))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<DeleteResult, StoreError> {
        self.ensure_online()?;
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(DeleteResult::acknowledged(0));
        };

        let before = docs.len();
        docs.retain(|(doc_id, _)| *doc_id != id);
        Ok(DeleteResult::acknowledged((before - docs.len()) as u64))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }
}
