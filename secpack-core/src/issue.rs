use std::fs;
use std::path::{Path, PathBuf};

use secpack_crypto::pem::load_private_key;
use secpack_crypto::KeyRole;
use secpack_license::{issue, LicenseClaims};
use tracing::info;

use crate::error::{io_at, PackagerError, PackagerResult};

/// Signs a license token with the vendor private key and writes it to `output`.
///
/// `expiry` is `YYYY-MM-DD`. Company and email must not contain `:` or line
/// breaks. The file holds the token as a single line without a newline.
pub fn issue_token(
    vendor_private_key: &Path,
    expiry: &str,
    company: &str,
    email: &str,
    output: &Path,
) -> PackagerResult<PathBuf> {
    let claims = LicenseClaims::new(expiry, company, email)
        .map_err(|e| PackagerError::Configuration(e.to_string()))?;
    let vendor = load_private_key(vendor_private_key, KeyRole::Vendor)?;
    let token = issue(&vendor, &claims)?;

    fs::write(output, token.as_bytes()).map_err(io_at(output))?;
    info!(
        path = %output.display(),
        company = %claims.company,
        expiry = %claims.expiry,
        "License token issued"
    );
    Ok(output.to_path_buf())
}
