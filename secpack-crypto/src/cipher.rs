//! Payload encryption using ChaCha20-Poly1305.
//!
//! Every blob is self-describing:
//!
//! ```text
//! version (1) | unix seconds, big endian (8) | nonce (12) | ciphertext + tag
//! ```
//!
//! The 21-byte header is bound as associated data, so version and timestamp
//! are covered by the tag along with the ciphertext.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

/// Format version byte of the current blob layout.
pub const FORMAT_VERSION: u8 = 0x81;

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Size of the authenticated header preceding the ciphertext.
pub const HEADER_SIZE: usize = 1 + 8 + NONCE_SIZE;

/// Parsed view of an encrypted blob.
#[derive(Clone, Debug)]
pub struct EncryptedBlob<'a> {
    /// Seconds since the epoch at encryption time.
    pub timestamp: u64,
    /// The nonce used for encryption (unique per blob).
    pub nonce: [u8; NONCE_SIZE],
    header: &'a [u8],
    ciphertext: &'a [u8],
}

impl<'a> EncryptedBlob<'a> {
    /// Splits a blob into its parts, rejecting unknown versions and short input.
    pub fn parse(blob: &'a [u8]) -> CryptoResult<Self> {
        if blob.len() < HEADER_SIZE + TAG_SIZE {
            return Err(CryptoError::Integrity("blob too short".into()));
        }
        if blob[0] != FORMAT_VERSION {
            return Err(CryptoError::Integrity(format!(
                "unsupported format version 0x{:02x}",
                blob[0]
            )));
        }
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&blob[1..9]);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&blob[9..HEADER_SIZE]);

        Ok(Self {
            timestamp: u64::from_be_bytes(ts),
            nonce,
            header: &blob[..HEADER_SIZE],
            ciphertext: &blob[HEADER_SIZE..],
        })
    }

    /// Length of the ciphertext including the tag.
    pub fn ciphertext_len(&self) -> usize {
        self.ciphertext.len()
    }
}

/// Encrypts `plaintext`, returning a versioned, timestamped, authenticated blob.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let timestamp = chrono::Utc::now().timestamp().max(0) as u64;

    let mut blob = Vec::with_capacity(HEADER_SIZE + plaintext.len() + TAG_SIZE);
    blob.push(FORMAT_VERSION);
    blob.extend_from_slice(&timestamp.to_be_bytes());
    blob.extend_from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &blob,
            },
        )
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts a blob produced by [`encrypt`].
///
/// Nothing is returned unless the tag verifies over header and ciphertext.
pub fn decrypt(key: &SymmetricKey, blob: &[u8]) -> CryptoResult<Vec<u8>> {
    let parsed = EncryptedBlob::parse(blob)?;
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(
            Nonce::from_slice(&parsed.nonce),
            Payload {
                msg: parsed.ciphertext,
                aad: parsed.header,
            },
        )
        .map_err(|_| CryptoError::Integrity("authentication failed (wrong key or tampered data)".into()))
}
