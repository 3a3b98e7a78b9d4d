//! The document store seam.

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use zbin_core::{NewNote, StoredDocument};

use crate::StoreError;

/// Length of store-assigned document ids
pub const ID_LEN: usize = 20;

/// `expires < before_ms`, ordered by id, at most `limit` documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredQuery {
    pub before_ms: i64,
    pub limit: usize,
}

/// A set of ids to delete as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBatch {
    pub ids: Vec<String>,
}

impl DeleteBatch {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Persistence operations the service and purger rely on.
///
/// Implementations share state internally, so handles are cheap to wrap in
/// `Arc` and pass to every component that needs one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a note under a fresh id. Documents are never updated.
    async fn add(&self, note: NewNote, created_ms: i64) -> Result<StoredDocument, StoreError>;

    /// Fetch a document; `None` if the id is unknown.
    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Delete one document. Returns whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Documents matching `query`, ordered by id.
    async fn query_expired(&self, query: ExpiredQuery) -> Result<Vec<StoredDocument>, StoreError>;

    /// Delete every id in `batch`, all or nothing. Missing ids are not errors.
    async fn commit_batch(&self, batch: &DeleteBatch) -> Result<(), StoreError>;

    /// Finish any batch interrupted by a crash or failure. Returns how many
    /// batches were replayed.
    async fn recover(&self) -> Result<usize, StoreError> {
        Ok(0)
    }

    /// Verify the backend is reachable.
    async fn check_health(&self) -> Result<(), StoreError>;
}

/// A random 20-character alphanumeric id.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}
