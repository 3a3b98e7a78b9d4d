//! In-process document store.
//!
//! Documents live in a `BTreeMap` keyed by id, so expired queries come back in
//! id order without sorting. A batch is removed under a single write lock,
//! which makes it atomic with respect to every other operation.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use zbin_core::{NewNote, StoredDocument};

use crate::store::{generate_id, DeleteBatch, DocumentStore, ExpiredQuery};
use crate::StoreError;

#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<String, StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document as-is, keeping its id. For seeding fixtures.
    pub async fn insert(&self, doc: StoredDocument) {
        self.docs.write().await.insert(doc.id.clone(), doc);
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, note: NewNote, created_ms: i64) -> Result<StoredDocument, StoreError> {
        let mut docs = self.docs.write().await;
        let id = loop {
            let id = generate_id();
            if !docs.contains_key(&id) {
                break id;
            }
        };
        let doc = note.into_document(id.clone(), created_ms);
        docs.insert(id, doc.clone());
        Ok(doc)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.remove(id).is_some())
    }

    async fn query_expired(&self, query: ExpiredQuery) -> Result<Vec<StoredDocument>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .values()
            .filter(|d| d.is_expired(query.before_ms))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn commit_batch(&self, batch: &DeleteBatch) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        for id in &batch.ids {
            docs.remove(id);
        }
        Ok(())
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
