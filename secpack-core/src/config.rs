//! Options for the pack and unpack workflows.
//!
//! Both option types are plain data with builder-style setters. `validate`
//! runs at the start of each workflow, before any key is loaded, so that
//! missing inputs surface as [`PackagerError::Configuration`].

use std::path::{Path, PathBuf};

use secpack_archive::names::DEFAULT_ARCHIVE_NAME;
use secpack_archive::safe_entry_path;
use secpack_license::Clock;

use crate::cancel::CancelToken;
use crate::error::{PackagerError, PackagerResult};

/// Default directory for decrypted output.
pub const DEFAULT_DECRYPT_DIR: &str = "./decrypted";

/// Inputs to [`crate::pack`].
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Flat directory whose regular files are encrypted. Subdirectories are skipped.
    pub input_dir: PathBuf,
    /// Where the archive (or loose artifacts) is written. Created if missing.
    pub output_dir: PathBuf,
    /// PEM public key of the recipient.
    pub recipient_public_key: PathBuf,
    /// Produce a zip archive. Default true.
    pub zip: bool,
    /// With `zip`, drop the loose artifacts after archiving. Default true.
    pub cleanup: bool,
    /// Embed a licensing manifest and the vendor key. Default false.
    pub license: bool,
    /// Vendor PEM public key, required when `license` is set.
    pub vendor_public_key: Option<PathBuf>,
    /// File name of the archive inside `output_dir`.
    pub archive_name: String,
    pub cancel: CancelToken,
}

impl PackOptions {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        recipient_public_key: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            recipient_public_key: recipient_public_key.into(),
            zip: true,
            cleanup: true,
            license: false,
            vendor_public_key: None,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            cancel: CancelToken::default(),
        }
    }

    pub fn zip(mut self, zip: bool) -> Self {
        self.zip = zip;
        self
    }

    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Enables licensing with the given vendor public key.
    pub fn license(mut self, vendor_public_key: impl Into<PathBuf>) -> Self {
        self.license = true;
        self.vendor_public_key = Some(vendor_public_key.into());
        self
    }

    pub fn archive_name(mut self, name: impl Into<String>) -> Self {
        self.archive_name = name.into();
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn validate(&self) -> PackagerResult<()> {
        if !self.input_dir.is_dir() {
            return Err(config_err(format!(
                "input directory {} does not exist",
                self.input_dir.display()
            )));
        }
        require_path("recipient public key", &self.recipient_public_key)?;
        if self.license {
            match &self.vendor_public_key {
                Some(path) => require_path("vendor public key", path)?,
                None => {
                    return Err(config_err(
                        "licensing is enabled but no vendor public key was given",
                    ));
                }
            }
        }
        if self.zip {
            let valid = safe_entry_path(&self.archive_name)
                .is_ok_and(|p| p.components().count() == 1);
            if !valid {
                return Err(config_err(format!(
                    "archive name {:?} must be a plain file name",
                    self.archive_name
                )));
            }
        }
        Ok(())
    }
}

/// Inputs to [`crate::unpack`].
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    pub archive: PathBuf,
    /// PEM private key of the recipient.
    pub recipient_private_key: PathBuf,
    /// Destination for decrypted files. Created if missing.
    pub output_dir: PathBuf,
    /// File holding the license token line.
    pub license_token: Option<PathBuf>,
    /// Vendor public key. Takes precedence over the one inside the archive.
    pub vendor_public_key: Option<PathBuf>,
    /// Time source for expiry checks.
    pub clock: Clock,
    pub cancel: CancelToken,
}

impl UnpackOptions {
    pub fn new(archive: impl Into<PathBuf>, recipient_private_key: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            recipient_private_key: recipient_private_key.into(),
            output_dir: PathBuf::from(DEFAULT_DECRYPT_DIR),
            license_token: None,
            vendor_public_key: None,
            clock: Clock::default(),
            cancel: CancelToken::default(),
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn license_token(mut self, path: impl Into<PathBuf>) -> Self {
        self.license_token = Some(path.into());
        self
    }

    pub fn vendor_public_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.vendor_public_key = Some(path.into());
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn validate(&self) -> PackagerResult<()> {
        if !self.archive.is_file() {
            return Err(config_err(format!(
                "archive {} does not exist",
                self.archive.display()
            )));
        }
        require_path("recipient private key", &self.recipient_private_key)?;
        require_path("output directory", &self.output_dir)?;
        if let Some(path) = &self.license_token {
            require_path("license token", path)?;
        }
        if let Some(path) = &self.vendor_public_key {
            require_path("vendor public key", path)?;
        }
        Ok(())
    }
}

fn config_err(msg: impl Into<String>) -> PackagerError {
    PackagerError::Configuration(msg.into())
}

fn require_path(what: &str, path: &Path) -> PackagerResult<()> {
    if path.as_os_str().is_empty() {
        return Err(config_err(format!("{what} path is empty")));
    }
    Ok(())
}
