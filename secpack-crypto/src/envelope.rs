//! Wrapping the package key for one recipient.
//!
//! The textual form of the symmetric key is encrypted with RSA-OAEP
//! (SHA-256, MGF1-SHA-256) under a fixed label, so a ciphertext produced for
//! another protocol never decrypts here.

use rsa::{
    oaep,
    traits::{RandomizedDecryptor, RandomizedEncryptor},
    RsaPrivateKey, RsaPublicKey,
};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;

/// OAEP label binding wrapped keys to this packaging protocol.
pub const OAEP_LABEL: &str = "secure_packager";

/// Encrypts the key's text form under the recipient's public key.
pub fn wrap_key(recipient: &RsaPublicKey, key: &SymmetricKey) -> CryptoResult<Vec<u8>> {
    let encrypting_key = oaep::EncryptingKey::<Sha256>::new_with_label(recipient.clone(), OAEP_LABEL);
    let text = key.to_text();
    let mut rng = rand::rngs::OsRng;
    let wrapped = encrypting_key
        .encrypt_with_rng(&mut rng, text.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("key wrap: {e}")))?;
    debug!(wrapped_len = wrapped.len(), "wrapped package key");
    Ok(wrapped)
}

/// Recovers the symmetric key from a wrapped blob. The RSA operation is blinded.
///
/// Fails with [`CryptoError::KeyUnwrap`] when OAEP decryption fails and with
/// [`CryptoError::MalformedKey`] when the plaintext is not a key.
pub fn unwrap_key(recipient: &RsaPrivateKey, wrapped: &[u8]) -> CryptoResult<SymmetricKey> {
    let decrypting_key = oaep::DecryptingKey::<Sha256>::new_with_label(recipient.clone(), OAEP_LABEL);
    let mut rng = rand::rngs::OsRng;
    let text = Zeroizing::new(
        decrypting_key
            .decrypt_with_rng(&mut rng, wrapped)
            .map_err(|e| CryptoError::KeyUnwrap(e.to_string()))?,
    );
    SymmetricKey::from_text(&text)
}
