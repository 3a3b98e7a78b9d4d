//! Document store on an OpenDAL operator.
//!
//! Layout:
//! ```text
//! notes/{id}.json      one StoredDocument per object
//! batches/{batch}.json JSON array of ids, present only while a batch is in flight
//! ```
//!
//! Object stores have no multi-key transactions, so a delete batch is written
//! to `batches/` before any note is removed and the journal is deleted last.
//! An interrupted batch is replayed by [`DocumentStore::recover`]; because
//! deletes are idempotent the replay always converges to the full batch.

use async_trait::async_trait;
use opendal::{ErrorKind, Operator};
use zbin_core::{NewNote, StoredDocument};

use crate::store::{generate_id, DeleteBatch, DocumentStore, ExpiredQuery};
use crate::StoreError;

const NOTES_DIR: &str = "notes/";
const BATCHES_DIR: &str = "batches/";

#[derive(Clone)]
pub struct ObjectStore {
    op: Operator,
}

impl ObjectStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    pub fn operator(&self) -> &Operator {
        &self.op
    }

    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        match self.op.stat(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names under `dir` with the `.json` suffix removed, sorted.
    async fn list_names(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let entries = match self.op.list(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names: Vec<String> = entries
            .iter()
            .filter_map(|e| e.name().strip_suffix(".json"))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, StoreError> {
        let buf = match self.op.read(path).await {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&buf.to_vec())
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                id: path.to_string(),
                source,
            })
    }

    async fn apply_batch(&self, journal: &str, ids: &[String]) -> Result<(), StoreError> {
        for id in ids {
            self.op.delete(&note_path(id)).await?;
        }
        self.op.delete(journal).await?;
        Ok(())
    }
}

fn note_path(id: &str) -> String {
    format!("{NOTES_DIR}{id}.json")
}

#[async_trait]
impl DocumentStore for ObjectStore {
    async fn add(&self, note: NewNote, created_ms: i64) -> Result<StoredDocument, StoreError> {
        let id = loop {
            let id = generate_id();
            if !self.exists(&note_path(&id)).await? {
                break id;
            }
        };
        let doc = note.into_document(id, created_ms);
        let body = serde_json::to_vec(&doc).map_err(|source| StoreError::Encode {
            id: doc.id.clone(),
            source,
        })?;
        self.op.write(&note_path(&doc.id), body).await?;
        tracing::debug!(id = %doc.id, expires = doc.expires, "note written");
        Ok(doc)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        self.read_json(&note_path(id)).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let path = note_path(id);
        if !self.exists(&path).await? {
            return Ok(false);
        }
        self.op.delete(&path).await?;
        Ok(true)
    }

    /// Scans `notes/` in id order, reading each object until `limit` expired
    /// documents are found, so one round costs O(live notes) reads. There is
    /// no expiry index on the object layout.
    ///
    /// Unreadable objects are logged and skipped; they must not block the
    /// purge of every expired note that sorts after them.
    async fn query_expired(&self, query: ExpiredQuery) -> Result<Vec<StoredDocument>, StoreError> {
        let mut found = Vec::new();
        for id in self.list_names(NOTES_DIR).await? {
            if found.len() >= query.limit {
                break;
            }
            let doc = match self.read_json::<StoredDocument>(&note_path(&id)).await {
                Ok(Some(doc)) => doc,
                // deleted since the listing
                Ok(None) => continue,
                Err(e @ StoreError::Corrupt { .. }) => {
                    tracing::warn!(id = %id, error = %e, "skipping unreadable note");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if doc.is_expired(query.before_ms) {
                found.push(doc);
            }
        }
        Ok(found)
    }

    async fn commit_batch(&self, batch: &DeleteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let journal = format!("{BATCHES_DIR}{}.json", generate_id());
        let body = serde_json::to_vec(&batch.ids).map_err(|source| StoreError::Encode {
            id: journal.clone(),
            source,
        })?;
        self.op.write(&journal, body).await?;
        self.apply_batch(&journal, &batch.ids).await
    }

    async fn recover(&self) -> Result<usize, StoreError> {
        let mut replayed = 0;
        for name in self.list_names(BATCHES_DIR).await? {
            let journal = format!("{BATCHES_DIR}{name}.json");
            let Some(ids) = self.read_json::<Vec<String>>(&journal).await? else {
                continue;
            };
            tracing::info!(batch = %name, documents = ids.len(), "replaying interrupted delete batch");
            self.apply_batch(&journal, &ids).await?;
            replayed += 1;
        }
        Ok(replayed)
    }

    async fn check_health(&self) -> Result<(), StoreError> {
        crate::health::check_health(&self.op).await
    }
}
