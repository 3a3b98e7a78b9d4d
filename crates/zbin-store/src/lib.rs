//! zbin-store: document stores, the expiration purger, and the note service
//!
//! Two `DocumentStore` backends:
//!   - **MemoryStore**: ordered in-process map; batch deletes under one write lock.
//!   - **ObjectStore**: one JSON object per note on any OpenDAL operator
//!     (memory, filesystem, S3), with a write-ahead journal per delete batch.

pub mod error;
pub mod health;
pub mod memory;
pub mod object;
pub mod operator;
pub mod purge;
pub mod service;
pub mod store;

pub use error::{PurgeError, ServiceError, StoreError};
pub use health::check_health;
pub use memory::MemoryStore;
pub use object::ObjectStore;
pub use operator::{build_operator, open_store, S3Credentials};
pub use purge::{Clock, PurgeOptions, PurgeReport, Purger, SystemClock};
pub use service::NoteService;
pub use store::{generate_id, DeleteBatch, DocumentStore, ExpiredQuery};
