//! Shared test helpers for license tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use base64::{engine::general_purpose::URL_SAFE, Engine};
use rsa::{pss, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use signature::RandomizedSigner;

/// Returns a cached 2048-bit vendor key pair.
pub fn vendor_keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// A key pair that did not sign anything.
pub fn impostor_keypair() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(generate)
}

fn generate() -> (RsaPrivateKey, RsaPublicKey) {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate RSA key");
    let public = private.to_public_key();
    (private, public)
}

/// Builds a token over an arbitrary payload, bypassing claim validation.
pub fn sign_raw(key: &RsaPrivateKey, payload: &str) -> String {
    sign_raw_with_salt(key, payload, 32)
}

/// Like [`sign_raw`] with an explicit PSS salt length.
pub fn sign_raw_with_salt(key: &RsaPrivateKey, payload: &str, salt_len: usize) -> String {
    let signing_key = pss::SigningKey::<Sha256>::new_with_salt_len(key.clone(), salt_len);
    let sig: Box<[u8]> = signing_key
        .sign_with_rng(&mut rand::rngs::OsRng, payload.as_bytes())
        .into();
    let inner = format!("{payload}:{}", URL_SAFE.encode(&sig));
    URL_SAFE.encode(inner.as_bytes())
}

/// Decodes a token to its inner colon-joined text.
pub fn decode(token: &str) -> String {
    String::from_utf8(URL_SAFE.decode(token).unwrap()).unwrap()
}

/// Re-encodes inner token text.
pub fn encode(inner: &str) -> String {
    URL_SAFE.encode(inner.as_bytes())
}
