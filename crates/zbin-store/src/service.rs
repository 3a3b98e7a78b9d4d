//! The note service: retrieve, store, delete, purge, healthcheck.
//!
//! Transport-agnostic; the daemon maps these results onto HTTP. Every
//! precondition (id present, record passes the schema gate) is checked before
//! the store is touched.

use std::sync::Arc;

use tracing::{debug, info, warn};
use zbin_core::{sanitize_id, validate, NewNote, Record, StoredDocument};

use crate::purge::{Clock, PurgeOptions, PurgeReport, Purger, SystemClock};
use crate::store::DocumentStore;
use crate::ServiceError;

pub struct NoteService {
    store: Arc<dyn DocumentStore>,
    purger: Purger,
    clock: Arc<dyn Clock>,
}

impl NoteService {
    pub fn new(store: Arc<dyn DocumentStore>, purge: PurgeOptions) -> Self {
        Self {
            purger: Purger::new(store.clone(), purge),
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for creation stamps, expiry checks and purges.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.purger = self.purger.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    /// Fetch a live document by id.
    ///
    /// Documents past their expiry are reported as not found even if the
    /// purger has not removed them yet.
    pub async fn retrieve(&self, raw_id: &str) -> Result<StoredDocument, ServiceError> {
        let id = sanitize_id(raw_id).ok_or(ServiceError::NoId)?;
        let doc = self.store.get(&id).await?.ok_or(ServiceError::NotFound)?;
        if doc.is_empty() {
            warn!(id = %id, "stored document has no ciphertext");
            return Err(ServiceError::EmptyDocument(id));
        }
        if doc.is_expired(self.clock.now_ms()) {
            debug!(id = %id, expires = doc.expires, "document expired, awaiting purge");
            return Err(ServiceError::NotFound);
        }
        Ok(doc)
    }

    /// Validate and persist a record. Returns the document as stored.
    pub async fn store(&self, record: &Record) -> Result<StoredDocument, ServiceError> {
        validate(record)?;
        let note = NewNote::from_record(record)?;
        let doc = self.store.add(note, self.clock.now_ms()).await?;
        info!(id = %doc.id, ttl = doc.ttl, burn = doc.burn, "note stored");
        Ok(doc)
    }

    /// Delete by id. Returns the sanitized id that was removed.
    pub async fn delete(&self, raw_id: &str) -> Result<String, ServiceError> {
        let id = sanitize_id(raw_id).ok_or(ServiceError::NoId)?;
        if !self.store.delete(&id).await? {
            return Err(ServiceError::NotFound);
        }
        info!(id = %id, "note deleted");
        Ok(id)
    }

    pub async fn purge(&self) -> Result<PurgeReport, ServiceError> {
        Ok(self.purger.purge().await?)
    }

    pub async fn healthcheck(&self) -> Result<(), ServiceError> {
        Ok(self.store.check_health().await?)
    }
}
