//! Expiration purger.
//!
//! One purge is a sequence of rounds. Each round evaluates `expires < now`
//! afresh, takes the first `page_size` matches by id, and deletes them as one
//! batch. The purge ends on the first round whose query comes back empty.
//!
//! Rounds run in a flat loop and yield to the scheduler between batches, so
//! stack depth and task fairness do not depend on how many documents expired.
//! A failed query or commit aborts the purge; batches committed before the
//! failure stay deleted, and running the purge again is always safe.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::store::{DeleteBatch, DocumentStore, ExpiredQuery};
use crate::PurgeError;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct PurgeOptions {
    /// Documents deleted per round
    pub page_size: usize,
    /// Budget for the whole purge; `None` runs until done
    pub timeout: Option<Duration>,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            timeout: None,
        }
    }
}

impl From<&zbin_core::config::PurgeConfig> for PurgeOptions {
    fn from(cfg: &zbin_core::config::PurgeConfig) -> Self {
        Self {
            page_size: cfg.page_size.max(1),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// What one purge accomplished. The terminal empty query is not a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub rounds: usize,
    pub deleted: usize,
}

pub struct Purger {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    options: PurgeOptions,
}

impl Purger {
    pub fn new(store: Arc<dyn DocumentStore>, options: PurgeOptions) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            options,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Delete every expired document, one batch per round.
    pub async fn purge(&self) -> Result<PurgeReport, PurgeError> {
        let deadline = self.options.timeout.map(|t| Instant::now() + t);
        let mut report = PurgeReport::default();

        let replayed = self.store.recover().await?;
        if replayed > 0 {
            info!(replayed, "purge: finished interrupted batches");
        }

        loop {
            let round = self.round();
            let deleted = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, round)
                    .await
                    .map_err(|_| PurgeError::TimedOut(report))??,
                None => round.await?,
            };
            if deleted == 0 {
                break;
            }
            report.rounds += 1;
            report.deleted += deleted;
            debug!(round = report.rounds, deleted, "purge: batch committed");

            tokio::task::yield_now().await;
        }

        info!(
            rounds = report.rounds,
            deleted = report.deleted,
            "purge complete"
        );
        Ok(report)
    }

    /// Query then delete one page. Returns how many documents were removed.
    async fn round(&self) -> Result<usize, PurgeError> {
        let query = ExpiredQuery {
            before_ms: self.clock.now_ms(),
            limit: self.options.page_size,
        };
        let expired = self.store.query_expired(query).await?;
        if expired.is_empty() {
            return Ok(0);
        }
        let batch = DeleteBatch::new(expired.into_iter().map(|d| d.id).collect());
        self.store.commit_batch(&batch).await?;
        Ok(batch.len())
    }
}
