//! Random note keys

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::{CryptoError, KEY_SIZES};

/// A raw AES key (16 or 32 bytes). Zeroized on drop.
#[derive(Clone)]
pub struct NoteKey {
    bytes: Vec<u8>,
}

impl NoteKey {
    /// Wrap raw key bytes, checking the length.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        validate_key_size(bytes.len())?;
        Ok(Self { bytes })
    }

    /// Parse the hex form carried in a share link fragment.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(crate::from_hex(s)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_hex(&self) -> String {
        crate::to_hex(&self.bytes)
    }
}

impl Drop for NoteKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for NoteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteKey")
            .field("len", &self.bytes.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

pub(crate) fn validate_key_size(len: usize) -> Result<(), CryptoError> {
    if KEY_SIZES.contains(&len) {
        Ok(())
    } else {
        Err(CryptoError::InvalidKeySize(len))
    }
}

/// Fill `buf` from the OS entropy source.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::UnsupportedPlatform(e.to_string()))
}

/// Generate a random key of `len` bytes (16 or 32).
pub fn generate_key(len: usize) -> Result<NoteKey, CryptoError> {
    validate_key_size(len)?;
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes)?;
    Ok(NoteKey { bytes })
}
