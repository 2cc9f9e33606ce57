//! The per-package symmetric key.
//!
//! One key is generated for every packaging run and protects every file in
//! that package. It leaves process memory only in wrapped form.

use crate::error::{CryptoError, CryptoResult};
use base64::{engine::general_purpose::URL_SAFE, Engine};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of symmetric keys in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// Length of the textual (base64url, padded) form of a key.
pub const KEY_TEXT_LEN: usize = 44;

/// A symmetric payload key with automatic zeroization on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generates a fresh key from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Encodes the key as base64url text. This is the form that gets wrapped.
    pub fn to_text(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE.encode(self.bytes))
    }

    /// Parses the textual form produced by [`SymmetricKey::to_text`].
    pub fn from_text(text: &[u8]) -> CryptoResult<Self> {
        let text = std::str::from_utf8(text)
            .map_err(|_| CryptoError::MalformedKey("key text is not UTF-8".into()))?;
        let decoded = Zeroizing::new(
            URL_SAFE
                .decode(text.trim())
                .map_err(|e| CryptoError::MalformedKey(format!("invalid base64: {e}")))?,
        );
        if decoded.len() != KEY_SIZE {
            return Err(CryptoError::MalformedKey(format!(
                "expected {KEY_SIZE} key bytes, got {}",
                decoded.len()
            )));
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
