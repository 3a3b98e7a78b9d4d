//! zbin-core: shared types, configuration, and the schema gate that keeps
//! plaintext and key material out of storage.

pub mod config;
pub mod error;
pub mod id;
pub mod schema;
pub mod types;

pub use error::{ZbinError, ZbinResult};
pub use id::sanitize_id;
pub use schema::{validate, Record, ValidationError};
pub use types::{NewNote, StoredDocument};
