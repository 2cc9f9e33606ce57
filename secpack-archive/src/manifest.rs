//! Licensing manifest (manifest.json) within a package.

use serde::{Deserialize, Serialize};

use crate::names::VENDOR_KEY_ENTRY;
use crate::path::safe_entry_path;
use crate::{ArchiveError, ArchiveResult};

/// Package metadata read by the unpacker before any decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Whether a valid vendor license token is needed to unpack.
    pub license_required: bool,
    /// Entry name of the bundled vendor public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_public_key: Option<String>,
}

impl Manifest {
    /// Manifest for a license-gated package bundling the vendor key.
    pub fn license_required() -> Self {
        Self {
            license_required: true,
            vendor_public_key: Some(VENDOR_KEY_ENTRY.to_string()),
        }
    }

    /// Parses and validates manifest bytes.
    pub fn from_json(bytes: &[u8]) -> ArchiveResult<Self> {
        let manifest: Self = serde_json::from_slice(bytes)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> ArchiveResult<Vec<u8>> {
        let mut out = serde_json::to_vec_pretty(self)?;
        out.push(b'\n');
        Ok(out)
    }

    /// The referenced vendor key entry must itself be a safe, flat name.
    pub fn validate(&self) -> ArchiveResult<()> {
        if let Some(name) = &self.vendor_public_key {
            let path = safe_entry_path(name)?;
            if path.components().count() != 1 {
                return Err(ArchiveError::Invalid(format!(
                    "vendor key reference must be a top-level entry: {name}"
                )));
            }
        }
        Ok(())
    }
}
