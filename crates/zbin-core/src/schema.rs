//! Schema gate for inbound note records.
//!
//! Every record passes through [`validate`] before it can reach a store. The
//! checks run in a fixed order and each stage reports all of its offending
//! fields at once:
//!
//! ```text
//! 1. required   {ciphertext, ttl}            -> "Missing required fields: ..."
//! 2. forbidden  {plaintext, key, id}         -> "REJECTED fields: ..."
//! 3. allowed    {ciphertext, ttl, burn, debug} -> "Not allowed fields: ..."
//! ```
//!
//! Required and forbidden names are listed in table order; disallowed names
//! are listed in the order they appear in the record.

use thiserror::Error;

/// An inbound record: field name to JSON value, in submission order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Fields every record must carry.
pub const REQUIRED_FIELDS: &[&str] = &["ciphertext", "ttl"];

/// Fields that would leak plaintext or key material, or spoof a store id.
pub const FORBIDDEN_FIELDS: &[&str] = &["plaintext", "key", "id"];

/// The complete set of fields a record may carry.
pub const ALLOWED_FIELDS: &[&str] = &["ciphertext", "ttl", "burn", "debug"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("REJECTED fields: {}", .0.join(", "))]
    RejectedFields(Vec<&'static str>),

    #[error("Not allowed fields: {}", .0.join(", "))]
    NotAllowedFields(Vec<String>),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Check a record against the field tables. Pure; never touches storage.
pub fn validate(record: &Record) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let rejected: Vec<&'static str> = FORBIDDEN_FIELDS
        .iter()
        .copied()
        .filter(|f| record.contains_key(*f))
        .collect();
    if !rejected.is_empty() {
        return Err(ValidationError::RejectedFields(rejected));
    }

    let not_allowed: Vec<String> = record
        .keys()
        .filter(|k| !ALLOWED_FIELDS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !not_allowed.is_empty() {
        return Err(ValidationError::NotAllowedFields(not_allowed));
    }

    Ok(())
}
