//! zbin-crypto: client-side note encryption
//!
//! Construction: AES-CTR (128- or 256-bit key, full 128-bit big-endian counter)
//!
//! Envelope format (binary, hex in transport):
//! ```text
//! [iv_size bytes: random IV][N bytes: ciphertext]
//! counter block = IV || 0x00 .. 0x00   (16 bytes)
//! ```
//!
//! The key never leaves the client: it rides in the share link fragment
//! (`<base>/<id>#<hex key>`), which browsers and HTTP clients do not send.
//! There is no authentication tag; a corrupted envelope decrypts to garbage.

pub mod encoding;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod link;
pub mod note;

pub use encoding::{from_hex, to_hex};
pub use envelope::Envelope;
pub use error::CryptoError;
pub use keys::{generate_key, NoteKey};
pub use link::ShareLink;
pub use note::{open_note, seal_note, SealedNote};

/// AES block size; also the length of the counter block
pub const BLOCK_SIZE: usize = 16;

/// Smallest IV accepted by [`Envelope::open`]
pub const MIN_IV_SIZE: usize = 12;

/// Largest IV accepted by [`Envelope::open`]
pub const MAX_IV_SIZE: usize = BLOCK_SIZE;

/// Permitted raw key lengths (AES-128, AES-256)
pub const KEY_SIZES: [usize; 2] = [16, 32];

/// Key length used when none is configured
pub const DEFAULT_KEY_SIZE: usize = 16;

/// IV length used when none is configured
pub const DEFAULT_IV_SIZE: usize = 16;
