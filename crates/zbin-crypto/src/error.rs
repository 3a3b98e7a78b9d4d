use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("no usable randomness source on this platform: {0}")]
    UnsupportedPlatform(String),

    #[error("unsupported AES key size: {0} (must be 16 or 32)")]
    InvalidKeySize(usize),

    #[error("invalid IV length {0}, must be at least {min} and at most {max}", min = crate::MIN_IV_SIZE, max = crate::MAX_IV_SIZE)]
    InvalidIvSize(usize),

    #[error("ciphertext too short: {len} bytes (IV alone is {iv_size})")]
    TooShort { len: usize, iv_size: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid share link: {0}")]
    InvalidLink(String),
}
