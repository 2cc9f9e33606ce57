//! RSA key material in PEM form.
//!
//! Public keys are accepted as SPKI (`PUBLIC KEY`) or PKCS#1
//! (`RSA PUBLIC KEY`); private keys as PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8
//! (`PRIVATE KEY`). Output is always SPKI / PKCS#8.

use std::path::Path;

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// Which party a key belongs to. Only used to label diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// The package recipient.
    Recipient,
    /// The license vendor.
    Vendor,
}

impl std::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recipient => f.write_str("recipient"),
            Self::Vendor => f.write_str("vendor"),
        }
    }
}

/// Returns the label of the first PEM block, if any.
fn pem_label(pem: &str) -> Option<&str> {
    let start = pem.find("-----BEGIN ")? + "-----BEGIN ".len();
    let rest = &pem[start..];
    let end = rest.find("-----")?;
    Some(&rest[..end])
}

/// Parses an RSA public key from SPKI or PKCS#1 PEM.
pub fn parse_public_key(pem: &str, role: KeyRole) -> CryptoResult<RsaPublicKey> {
    if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
        return Ok(key);
    }
    if let Ok(key) = RsaPublicKey::from_pkcs1_pem(pem) {
        return Ok(key);
    }
    Err(match pem_label(pem) {
        None => CryptoError::KeyFormat(format!("{role} public key: no PEM block found")),
        Some(label @ ("PUBLIC KEY" | "RSA PUBLIC KEY")) => {
            CryptoError::KeyFormat(format!("{role} public key: malformed {label} block"))
        }
        Some(label) => CryptoError::KeyFormat(format!(
            "{role} public key: expected PUBLIC KEY or RSA PUBLIC KEY, found {label}"
        )),
    })
}

/// Parses an RSA private key from PKCS#1 or PKCS#8 PEM.
pub fn parse_private_key(pem: &str, role: KeyRole) -> CryptoResult<RsaPrivateKey> {
    if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem) {
        return Ok(key);
    }
    if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
        return Ok(key);
    }
    Err(match pem_label(pem) {
        None => CryptoError::KeyFormat(format!("{role} private key: no PEM block found")),
        Some(label @ ("PRIVATE KEY" | "RSA PRIVATE KEY")) => CryptoError::KeyFormat(format!(
            "{role} private key: malformed {label} block (not an RSA key?)"
        )),
        Some(label) => CryptoError::KeyFormat(format!(
            "{role} private key: expected PRIVATE KEY or RSA PRIVATE KEY, found {label}"
        )),
    })
}

fn read_pem(path: &Path, what: &str) -> CryptoResult<Zeroizing<String>> {
    std::fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::KeyFormat(format!("cannot read {what} {}: {e}", path.display())))
}

/// Reads and parses a public key file.
pub fn load_public_key(path: &Path, role: KeyRole) -> CryptoResult<RsaPublicKey> {
    let pem = read_pem(path, &format!("{role} public key"))?;
    parse_public_key(&pem, role)
}

/// Reads and parses a private key file.
pub fn load_private_key(path: &Path, role: KeyRole) -> CryptoResult<RsaPrivateKey> {
    let pem = read_pem(path, &format!("{role} private key"))?;
    parse_private_key(&pem, role)
}

/// Encodes a public key as SPKI PEM.
pub fn public_key_to_pem(key: &RsaPublicKey) -> CryptoResult<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

/// Encodes a private key as PKCS#8 PEM.
pub fn private_key_to_pem(key: &RsaPrivateKey) -> CryptoResult<Zeroizing<String>> {
    key.to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyFormat(e.to_string()))
}

/// Derives the public half of a private key.
pub fn public_key_from_private(key: &RsaPrivateKey) -> RsaPublicKey {
    key.to_public_key()
}
