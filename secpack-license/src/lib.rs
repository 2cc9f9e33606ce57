//! Vendor licensing for secure packages.
//!
//! A vendor signs a short token naming the licensee and an expiry date.
//! Unpacking a license-gated package verifies that token against the vendor
//! public key and applies the expiry policy before any key material is
//! touched.
//!
//! # Token Format
//!
//! `base64url(expiry:company:email:NOFERNET:base64url(signature))`
//!
//! The signature is RSASSA-PSS with SHA-256 over
//! `expiry:company:email:NOFERNET`.

mod error;
mod policy;
mod token;

pub use error::{LicenseError, LicenseResult};
pub use policy::{
    evaluate, Clock, LicenseReport, LicenseStatus, BLOCK_WINDOW_HOURS, WARNING_WINDOW_DAYS,
};
pub use token::{
    issue, parse_expiry, verify, LicenseClaims, VerifiedToken, EXPIRY_FORMAT, RESERVED_FIELD,
};

use secpack_crypto::RsaPublicKey;

/// Verifies a token and applies the expiry policy at the clock's current time.
pub fn verify_license(
    token: &str,
    vendor: &RsaPublicKey,
    clock: Clock,
) -> LicenseResult<LicenseReport> {
    let verified = verify(token, vendor)?;
    evaluate(&verified, clock.now())
}
