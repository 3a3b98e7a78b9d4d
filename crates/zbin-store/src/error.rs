use thiserror::Error;
use zbin_core::ValidationError;

use crate::purge::PurgeReport;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] opendal::Error),

    #[error("corrupt document {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("encoding document {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("purge aborted: {0}")]
    Store(#[from] StoreError),

    #[error("purge timed out after {} rounds ({} documents deleted)", .0.rounds, .0.deleted)]
    TimedOut(PurgeReport),
}

/// Errors surfaced by [`crate::NoteService`], one per user-visible outcome.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No Id")]
    NoId,

    #[error("Unable to find the document")]
    NotFound,

    #[error("document {0} is empty")]
    EmptyDocument(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Purge(#[from] PurgeError),
}
