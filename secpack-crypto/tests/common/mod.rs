//! Shared test helpers for crypto tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use secpack_crypto::{RsaPrivateKey, RsaPublicKey};

/// Returns a cached 2048-bit key pair. Generation is slow, so each test
/// binary does it once.
pub fn recipient_keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// A second, unrelated key pair for wrong-key tests.
pub fn other_keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(generate)
}

fn generate() -> (RsaPrivateKey, RsaPublicKey) {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate RSA key");
    let public = private.to_public_key();
    (private, public)
}
