use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{Record, ValidationError};

/// Milliseconds in one TTL day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Longest TTL a note may request, in days.
pub const MAX_TTL_DAYS: u32 = 365;

/// A persisted note. Created once, never updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: String,
    /// Lowercase hex of `IV || ciphertext`
    #[serde(default)]
    pub ciphertext: String,
    /// Time to live in days
    #[serde(default)]
    pub ttl: u32,
    /// Burn-after-read flag (persisted, not enforced)
    #[serde(default)]
    pub burn: bool,
    #[serde(default)]
    pub debug: bool,
    /// Creation time, epoch milliseconds
    #[serde(default)]
    pub created: i64,
    /// `created + ttl * MS_PER_DAY`
    #[serde(default)]
    pub expires: i64,
}

impl StoredDocument {
    /// True when `expires` is strictly before `now_ms`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expires < now_ms
    }

    /// A document with no ciphertext violates the schema and cannot be served.
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }
}

/// A record that has passed the schema gate and been coerced into types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub ciphertext: String,
    pub ttl: u32,
    pub burn: bool,
    pub debug: bool,
}

impl NewNote {
    /// Coerce a gate-approved record.
    ///
    /// `ttl` may be a JSON integer or a decimal string. `burn` and `debug`
    /// accept booleans, `0`/`1`, or their string forms. The ciphertext is
    /// trimmed and must be even-length hex; it is stored lowercase.
    pub fn from_record(record: &Record) -> Result<Self, ValidationError> {
        let ciphertext = match record.get("ciphertext") {
            Some(Value::String(s)) => s.trim().to_ascii_lowercase(),
            _ => return Err(invalid("ciphertext", "must be a string")),
        };
        if ciphertext.is_empty() {
            return Err(invalid("ciphertext", "must not be empty"));
        }
        if ciphertext.len() % 2 != 0 || !ciphertext.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("ciphertext", "must be hex encoded"));
        }

        let ttl = parse_ttl(record.get("ttl"))?;
        let burn = parse_flag("burn", record.get("burn"))?;
        let debug = parse_flag("debug", record.get("debug"))?;

        Ok(Self {
            ciphertext,
            ttl,
            burn,
            debug,
        })
    }

    /// Stamp the note with its id and lifetime.
    pub fn into_document(self, id: String, created_ms: i64) -> StoredDocument {
        StoredDocument {
            id,
            expires: created_ms + i64::from(self.ttl) * MS_PER_DAY,
            created: created_ms,
            ciphertext: self.ciphertext,
            ttl: self.ttl,
            burn: self.burn,
            debug: self.debug,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn parse_ttl(value: Option<&Value>) -> Result<u32, ValidationError> {
    let days = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid("ttl", "must be a whole number of days"))?;

    if days == 0 || days > u64::from(MAX_TTL_DAYS) {
        return Err(invalid(
            "ttl",
            format!("must be between 1 and {MAX_TTL_DAYS} days"),
        ));
    }
    Ok(days as u32)
}

fn parse_flag(field: &'static str, value: Option<&Value>) -> Result<bool, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid(field, "must be 0 or 1")),
        },
        Some(Value::String(s)) => match s.trim() {
            "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(invalid(field, "must be a boolean")),
        },
        Some(_) => Err(invalid(field, "must be a boolean")),
    }
}
