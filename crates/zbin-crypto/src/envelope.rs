//! AES-CTR envelopes: `[IV][ciphertext]`
//!
//! Each call to [`Envelope::encrypt`] draws a fresh IV, so two encryptions of
//! the same plaintext under the same key never share a keystream. The counter
//! block is the IV padded with zeros to 16 bytes and incremented as a single
//! 128-bit big-endian integer.

use aes::cipher::{KeyIvInit, StreamCipher};

use crate::keys::{fill_random, validate_key_size, NoteKey};
use crate::{CryptoError, BLOCK_SIZE, MAX_IV_SIZE, MIN_IV_SIZE};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// An imported key plus IV size, usable for encrypt and decrypt.
///
/// Holds only immutable key material; share it freely between tasks.
#[derive(Debug, Clone)]
pub struct Envelope {
    key: NoteKey,
    iv_size: usize,
}

impl Envelope {
    /// Import `raw_key` (16 or 32 bytes) for envelopes with `iv_size`-byte IVs.
    pub fn open(raw_key: &[u8], iv_size: usize) -> Result<Self, CryptoError> {
        if !(MIN_IV_SIZE..=MAX_IV_SIZE).contains(&iv_size) {
            return Err(CryptoError::InvalidIvSize(iv_size));
        }
        validate_key_size(raw_key.len())?;
        Ok(Self {
            key: NoteKey::from_bytes(raw_key.to_vec())?,
            iv_size,
        })
    }

    /// Encrypt `plaintext`, returning `IV || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; self.iv_size + plaintext.len()];
        let (iv, body) = out.split_at_mut(self.iv_size);
        fill_random(iv)?;
        body.copy_from_slice(plaintext);

        let counter = counter_block(iv);
        self.apply_keystream(&counter, body)?;
        Ok(out)
    }

    /// Decrypt `IV || ciphertext`. No integrity check is performed.
    pub fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if envelope.len() < self.iv_size {
            return Err(CryptoError::TooShort {
                len: envelope.len(),
                iv_size: self.iv_size,
            });
        }
        let (iv, ciphertext) = envelope.split_at(self.iv_size);
        let counter = counter_block(iv);
        let mut plaintext = ciphertext.to_vec();
        self.apply_keystream(&counter, &mut plaintext)?;
        Ok(plaintext)
    }

    /// Encrypt the UTF-8 bytes of `text`.
    pub fn encrypt_text(&self, text: &str) -> Result<Vec<u8>, CryptoError> {
        self.encrypt(text.as_bytes())
    }

    /// Decrypt and decode as UTF-8 for display; invalid sequences become U+FFFD.
    pub fn decrypt_text(&self, envelope: &[u8]) -> Result<String, CryptoError> {
        let bytes = self.decrypt(envelope)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn apply_keystream(
        &self,
        counter: &[u8; BLOCK_SIZE],
        buf: &mut [u8],
    ) -> Result<(), CryptoError> {
        let key = self.key.as_bytes();
        match key.len() {
            16 => Aes128Ctr::new_from_slices(key, counter)
                .map_err(|_| CryptoError::InvalidKeySize(key.len()))?
                .apply_keystream(buf),
            32 => Aes256Ctr::new_from_slices(key, counter)
                .map_err(|_| CryptoError::InvalidKeySize(key.len()))?
                .apply_keystream(buf),
            n => return Err(CryptoError::InvalidKeySize(n)),
        }
        Ok(())
    }
}

/// IV in the leading bytes, zero padded to one block.
fn counter_block(iv: &[u8]) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    block[..iv.len()].copy_from_slice(iv);
    block
}
