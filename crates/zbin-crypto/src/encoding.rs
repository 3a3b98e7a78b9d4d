//! Hex transport encoding for keys and envelopes.

use crate::CryptoError;

/// Lowercase hex, two characters per byte.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode hex of either case. Odd lengths and non-hex characters are errors.
pub fn from_hex(s: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(hex::decode(s.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_output() {
        assert_eq!(to_hex(&[0x00, 0xAB, 0x0F, 0xFF]), "00ab0fff");
    }

    #[test]
    fn test_decode_mixed_case() {
        assert_eq!(from_hex("00Ab0fFF").unwrap(), vec![0x00, 0xAB, 0x0F, 0xFF]);
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        assert!(matches!(from_hex("abc"), Err(CryptoError::InvalidHex(_))));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(matches!(from_hex("zz"), Err(CryptoError::InvalidHex(_))));
    }
}
