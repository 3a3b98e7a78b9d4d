//! Shared test doubles for store-level integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use zbin_core::{NewNote, StoredDocument};
use zbin_store::{
    Clock, DeleteBatch, DocumentStore, ExpiredQuery, MemoryStore, StoreError,
};

/// Clock pinned to a single instant.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Wraps a `MemoryStore`, counting calls and injecting failures.
#[derive(Clone, Default)]
pub struct ProbeStore {
    pub inner: MemoryStore,
    pub calls: Arc<AtomicUsize>,
    pub queries: Arc<AtomicUsize>,
    pub commits: Arc<AtomicUsize>,
    /// Fail the commit with this 1-based number
    pub fail_commit: Option<usize>,
    /// Fail every query
    pub fail_query: bool,
    /// Sleep before answering a query
    pub query_delay: Option<Duration>,
}

impl ProbeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for ProbeStore {
    async fn add(&self, note: NewNote, created_ms: i64) -> Result<StoredDocument, StoreError> {
        self.touch();
        self.inner.add(note, created_ms).await
    }

    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.touch();
        self.inner.get(id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.touch();
        self.inner.delete(id).await
    }

    async fn query_expired(&self, query: ExpiredQuery) -> Result<Vec<StoredDocument>, StoreError> {
        self.touch();
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_query {
            return Err(StoreError::Unavailable("query refused".into()));
        }
        self.inner.query_expired(query).await
    }

    async fn commit_batch(&self, batch: &DeleteBatch) -> Result<(), StoreError> {
        self.touch();
        let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_commit == Some(n) {
            return Err(StoreError::Unavailable(format!("commit {n} refused")));
        }
        self.inner.commit_batch(batch).await
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        self.touch();
        self.inner.check_health().await
    }
}

/// Insert `count` documents with ids `{prefix}{i:06}` expiring at `expires`.
pub async fn seed(store: &MemoryStore, prefix: &str, count: usize, expires: i64) {
    for i in 0..count {
        store
            .insert(StoredDocument {
                id: format!("{prefix}{i:06}"),
                ciphertext: "00ff".into(),
                ttl: 1,
                expires,
                ..Default::default()
            })
            .await;
    }
}
