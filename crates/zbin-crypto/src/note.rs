//! One-shot helpers: text in, hex envelope and key out (and back).

use crate::{from_hex, generate_key, to_hex, CryptoError, Envelope, NoteKey};

/// Output of [`seal_note`]. The key must stay with the client.
#[derive(Debug)]
pub struct SealedNote {
    /// Lowercase hex of `IV || ciphertext`, safe to upload
    pub ciphertext: String,
    pub key: NoteKey,
}

/// Encrypt `text` under a fresh key of `key_size` bytes.
pub fn seal_note(text: &str, key_size: usize, iv_size: usize) -> Result<SealedNote, CryptoError> {
    let key = generate_key(key_size)?;
    let envelope = Envelope::open(key.as_bytes(), iv_size)?;
    let ciphertext = to_hex(&envelope.encrypt_text(text)?);
    tracing::debug!(key_size, iv_size, bytes = text.len(), "note sealed");
    Ok(SealedNote { ciphertext, key })
}

/// Decrypt a hex envelope with a hex key.
pub fn open_note(key_hex: &str, ciphertext_hex: &str, iv_size: usize) -> Result<String, CryptoError> {
    let key = NoteKey::from_hex(key_hex)?;
    let envelope = Envelope::open(key.as_bytes(), iv_size)?;
    envelope.decrypt_text(&from_hex(ciphertext_hex)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_IV_SIZE, DEFAULT_KEY_SIZE};

    #[test]
    fn test_seal_open_roundtrip() {
        let sealed = seal_note("meet at noon", DEFAULT_KEY_SIZE, DEFAULT_IV_SIZE).unwrap();
        assert_eq!(sealed.ciphertext.len(), 2 * (DEFAULT_IV_SIZE + "meet at noon".len()));
        assert!(sealed
            .ciphertext
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));

        let text = open_note(&sealed.key.to_hex(), &sealed.ciphertext, DEFAULT_IV_SIZE).unwrap();
        assert_eq!(text, "meet at noon");
    }

    #[test]
    fn test_open_short_ciphertext() {
        let key = generate_key(16).unwrap();
        assert!(matches!(
            open_note(&key.to_hex(), "00ff", 16),
            Err(CryptoError::TooShort { len: 2, iv_size: 16 })
        ));
    }

    #[test]
    fn test_open_rejects_bad_hex() {
        let key = generate_key(16).unwrap();
        assert!(matches!(
            open_note(&key.to_hex(), "not hex", 16),
            Err(CryptoError::InvalidHex(_))
        ));
    }
}
