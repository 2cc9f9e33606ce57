//! Cryptographic building blocks for secure packages.
//!
//! - [`SymmetricKey`]: one random ChaCha20-Poly1305 key per package
//! - [`encrypt`] / [`decrypt`]: versioned, authenticated payload blobs
//! - [`wrap_key`] / [`unwrap_key`]: RSA-OAEP envelope for the package key
//! - [`pem`]: RSA key parsing (PKCS#1, PKCS#8, SPKI) and canonical output
//!
//! A single key protects every file of a package. Compromise of that key
//! exposes the whole package; there are no per-file keys.

mod cipher;
mod envelope;
mod error;
mod key;
pub mod pem;

pub use cipher::{decrypt, encrypt, EncryptedBlob, FORMAT_VERSION, HEADER_SIZE, NONCE_SIZE, TAG_SIZE};
pub use envelope::{unwrap_key, wrap_key, OAEP_LABEL};
pub use error::{CryptoError, CryptoResult};
pub use key::{SymmetricKey, KEY_SIZE, KEY_TEXT_LEN};
pub use pem::KeyRole;

pub use rsa::{RsaPrivateKey, RsaPublicKey};
