//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// PEM text could not be parsed, or holds the wrong kind of key.
    #[error("invalid key format: {0}")]
    KeyFormat(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Ciphertext failed authentication, or its version/structure is invalid.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// The wrapped key could not be decrypted (wrong private key or corrupted blob).
    #[error("key unwrap failed: {0}")]
    KeyUnwrap(String),

    /// The unwrapped bytes are not a validly encoded symmetric key.
    #[error("malformed symmetric key: {0}")]
    MalformedKey(String),
}
