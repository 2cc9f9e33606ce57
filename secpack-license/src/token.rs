//! License token issuance and signature verification.
//!
//! A token is one line of base64url text. Decoded, it holds five
//! colon-separated fields:
//!
//! ```text
//! expiry:company:email:reserved:signature
//! ```
//!
//! `expiry` is `YYYY-MM-DD`. `reserved` is always [`RESERVED_FIELD`]; the slot
//! once carried key material and is kept so older tokens keep parsing.
//! `signature` is base64url RSASSA-PSS (SHA-256) over the first four fields
//! joined by colons, exactly as they appear in the token.
//!
//! Issued tokens use a salt as long as the digest. Verification also accepts
//! the maximum salt length, which is what older vendor tooling produced.

use base64::{
    alphabet,
    engine::{general_purpose::URL_SAFE, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use chrono::NaiveDate;
use rsa::{pss, traits::PublicKeyParts, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use signature::{RandomizedSigner, Verifier};

use crate::error::{LicenseError, LicenseResult};

/// Fixed value of the fourth token field.
pub const RESERVED_FIELD: &str = "NOFERNET";

/// Date format of the expiry field.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// Number of colon-separated fields in a decoded token.
const FIELD_COUNT: usize = 5;

/// SHA-256 output size, also the PSS salt length of issued tokens.
const DIGEST_LEN: usize = 32;

/// URL-safe alphabet, accepts input with or without padding.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parses a `YYYY-MM-DD` date.
pub fn parse_expiry(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), EXPIRY_FORMAT).ok()
}

/// What the vendor asserts in a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseClaims {
    pub expiry: NaiveDate,
    pub company: String,
    pub email: String,
}

impl LicenseClaims {
    /// Validates issuance input.
    ///
    /// Company and email must be non-empty and free of `:` and line breaks,
    /// which would corrupt the field layout.
    pub fn new(expiry: &str, company: &str, email: &str) -> LicenseResult<Self> {
        let expiry = parse_expiry(expiry).ok_or_else(|| {
            LicenseError::InvalidClaims(format!("expiry must be YYYY-MM-DD, got {expiry:?}"))
        })?;
        check_field("company", company)?;
        check_field("email", email)?;
        Ok(Self {
            expiry,
            company: company.to_string(),
            email: email.to_string(),
        })
    }

    /// The signed part of the token: `expiry:company:email:reserved`.
    fn payload(&self) -> String {
        format!(
            "{}:{}:{}:{RESERVED_FIELD}",
            self.expiry.format(EXPIRY_FORMAT),
            self.company,
            self.email
        )
    }
}

fn check_field(name: &str, value: &str) -> LicenseResult<()> {
    if value.trim().is_empty() {
        return Err(LicenseError::InvalidClaims(format!("{name} is required")));
    }
    if value.contains([':', '\n', '\r']) {
        return Err(LicenseError::InvalidClaims(format!(
            "{name} must not contain ':' or line breaks"
        )));
    }
    Ok(())
}

/// Signs `claims` with the vendor key and returns the token line.
pub fn issue(vendor: &RsaPrivateKey, claims: &LicenseClaims) -> LicenseResult<String> {
    let payload = claims.payload();
    let signing_key = pss::SigningKey::<Sha256>::new_with_salt_len(vendor.clone(), DIGEST_LEN);
    let mut rng = rand::rngs::OsRng;
    let signature = signing_key
        .try_sign_with_rng(&mut rng, payload.as_bytes())
        .map_err(|e| LicenseError::Signing(e.to_string()))?;
    let sig_bytes: Box<[u8]> = signature.into();

    let inner = format!("{payload}:{}", URL_SAFE.encode(&sig_bytes));
    Ok(URL_SAFE.encode(inner.as_bytes()))
}

/// A token whose signature has been checked against a vendor key.
///
/// The expiry has not been evaluated yet; see [`crate::evaluate`].
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub claims: LicenseClaims,
}

/// Decodes `token`, checks the vendor signature, then parses the expiry.
pub fn verify(token: &str, vendor: &RsaPublicKey) -> LicenseResult<VerifiedToken> {
    let decoded = LENIENT_URL_SAFE
        .decode(token.trim())
        .map_err(|e| LicenseError::TokenFormat(format!("invalid token base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| LicenseError::TokenFormat("token is not UTF-8".into()))?;

    let fields: Vec<&str> = decoded.split(':').collect();
    if fields.len() != FIELD_COUNT {
        return Err(LicenseError::TokenFormat(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }
    let (expiry, company, email, reserved, sig_b64) =
        (fields[0], fields[1], fields[2], fields[3], fields[4]);

    let sig_bytes = LENIENT_URL_SAFE
        .decode(sig_b64)
        .map_err(|e| LicenseError::TokenFormat(format!("invalid signature base64: {e}")))?;
    let signature =
        pss::Signature::try_from(sig_bytes.as_slice()).map_err(|_| LicenseError::TokenSignature)?;

    let payload = format!("{expiry}:{company}:{email}:{reserved}");
    let valid = accepted_salt_lengths(vendor).into_iter().any(|salt_len| {
        pss::VerifyingKey::<Sha256>::new_with_salt_len(vendor.clone(), salt_len)
            .verify(payload.as_bytes(), &signature)
            .is_ok()
    });
    if !valid {
        return Err(LicenseError::TokenSignature);
    }

    let expiry = NaiveDate::parse_from_str(expiry, EXPIRY_FORMAT)
        .map_err(|e| LicenseError::TokenFormat(format!("invalid expiry date {expiry:?}: {e}")))?;

    Ok(VerifiedToken {
        claims: LicenseClaims {
            expiry,
            company: company.to_string(),
            email: email.to_string(),
        },
    })
}

/// Digest-length salt first, then the largest salt the key size allows.
fn accepted_salt_lengths(vendor: &RsaPublicKey) -> [usize; 2] {
    let em_len = (vendor.n().bits() - 1).div_ceil(8);
    [DIGEST_LEN, em_len.saturating_sub(DIGEST_LEN + 2)]
}
