//! Unpacking: extract, check the license, unwrap the key, decrypt.
//!
//! The stages run strictly in order and any failure is terminal:
//!
//! ```text
//! Extracted -> LicenseChecked | LicenseSkipped -> KeyUnwrapped -> Decrypted
//! ```
//!
//! The license gate completes before the private key is used. Decrypted
//! files are staged inside the output directory and moved into place only
//! after every file has authenticated, so a tampered package leaves the
//! output directory untouched. The extraction area is a temporary directory
//! that is removed on every exit path.

use std::fs;
use std::path::{Path, PathBuf};

use secpack_archive::names::WRAPPED_KEY_ENTRY;
use secpack_archive::{ArchiveReader, ExtractedArchive, Manifest};
use secpack_crypto::pem::{load_private_key, load_public_key};
use secpack_crypto::{decrypt, unwrap_key, KeyRole};
use secpack_license::{verify_license, LicenseReport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commit::commit_all;
use crate::config::UnpackOptions;
use crate::error::{io_at, PackagerError, PackagerResult};

/// Progress markers of an unpack, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackStage {
    Extracted,
    LicenseChecked,
    LicenseSkipped,
    KeyUnwrapped,
    Decrypted,
}

/// What a successful unpack produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnpackOutcome {
    /// Decrypted files in the output directory, in name order.
    pub files: Vec<PathBuf>,
    /// License report, when a license was checked.
    pub license: Option<LicenseReport>,
}

/// Why licensing was enforced. Any one signal is enough.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LicenseSignals {
    manifest: bool,
    token: bool,
    vendor_key: bool,
}

impl LicenseSignals {
    fn gather(manifest: Option<&Manifest>, options: &UnpackOptions) -> Self {
        Self {
            manifest: manifest.is_some_and(|m| m.license_required),
            token: options.license_token.is_some(),
            vendor_key: options.vendor_public_key.is_some(),
        }
    }

    fn required(&self) -> bool {
        self.manifest || self.token || self.vendor_key
    }
}

/// Unpacks `options.archive` into `options.output_dir`.
pub fn unpack(options: &UnpackOptions) -> PackagerResult<UnpackOutcome> {
    options.validate()?;

    let private_key = load_private_key(&options.recipient_private_key, KeyRole::Recipient)?;

    let work = tempfile::Builder::new()
        .prefix("secpack-unpack-")
        .tempdir()
        .map_err(io_at(&std::env::temp_dir()))?;
    let extracted = ArchiveReader::open(&options.archive)?.extract_to(work.path())?;
    stage(UnpackStage::Extracted, extracted.files().len());
    options.cancel.checkpoint("extraction")?;

    let license = check_license(&extracted, options)?;
    options.cancel.checkpoint("license check")?;

    let wrapped = extracted.read(WRAPPED_KEY_ENTRY)?;
    let key = unwrap_key(&private_key, &wrapped)?;
    stage(UnpackStage::KeyUnwrapped, 0);
    options.cancel.checkpoint("key unwrap")?;

    let payload = extracted.payload_entries();
    if payload.is_empty() {
        warn!("Archive contains no encrypted files");
    }

    fs::create_dir_all(&options.output_dir).map_err(io_at(&options.output_dir))?;
    let staging = tempfile::Builder::new()
        .prefix(".secpack-decrypt-")
        .tempdir_in(&options.output_dir)
        .map_err(io_at(&options.output_dir))?;

    for (entry, original) in &payload {
        options.cancel.checkpoint("decryption")?;
        let blob = extracted.read(entry)?;
        let plaintext = decrypt(&key, &blob)?;
        let path = staging.path().join(original);
        fs::write(&path, &plaintext).map_err(io_at(&path))?;
        info!(entry = %entry, file = %original, bytes = plaintext.len(), "Decrypted file");
    }
    drop(key);

    let files = commit(staging.path(), &options.output_dir, &payload)?;
    stage(UnpackStage::Decrypted, files.len());

    if let Err(e) = staging.close() {
        warn!(error = %e, "Failed to remove decryption staging directory");
    }
    if let Err(e) = work.close() {
        warn!(error = %e, "Failed to remove extraction directory");
    }

    info!(
        files = files.len(),
        output = %options.output_dir.display(),
        "Unpack complete"
    );
    Ok(UnpackOutcome { files, license })
}

/// Runs the license gate. Returns `None` when licensing is not in force.
fn check_license(
    extracted: &ExtractedArchive,
    options: &UnpackOptions,
) -> PackagerResult<Option<LicenseReport>> {
    let manifest = extracted.manifest()?;
    let signals = LicenseSignals::gather(manifest.as_ref(), options);
    if !signals.required() {
        stage(UnpackStage::LicenseSkipped, 0);
        return Ok(None);
    }
    info!(
        manifest = signals.manifest,
        token = signals.token,
        vendor_key = signals.vendor_key,
        "License check required"
    );

    let token_path = options.license_token.as_deref().ok_or_else(|| {
        PackagerError::Configuration("a license token is required to unpack this package".into())
    })?;
    let vendor_path = resolve_vendor_key(extracted, manifest.as_ref(), options)?;

    let token = read_token(token_path)?;
    let vendor = load_public_key(&vendor_path, KeyRole::Vendor)?;
    let report = verify_license(&token, &vendor, options.clock)?;
    stage(UnpackStage::LicenseChecked, 0);
    Ok(Some(report))
}

/// An explicitly configured key wins over the one bundled in the archive.
fn resolve_vendor_key(
    extracted: &ExtractedArchive,
    manifest: Option<&Manifest>,
    options: &UnpackOptions,
) -> PackagerResult<PathBuf> {
    if let Some(path) = &options.vendor_public_key {
        if !path.is_file() {
            return Err(PackagerError::Configuration(format!(
                "vendor public key {} does not exist",
                path.display()
            )));
        }
        debug!(path = %path.display(), "Using configured vendor key");
        return Ok(path.clone());
    }
    manifest
        .and_then(|m| m.vendor_public_key.as_deref())
        .and_then(|name| extracted.path_of(name))
        .ok_or_else(|| {
            PackagerError::Configuration(
                "license check required but no vendor public key is available".into(),
            )
        })
}

fn read_token(path: &Path) -> PackagerResult<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        PackagerError::Configuration(format!(
            "cannot read license token {}: {e}",
            path.display()
        ))
    })?;
    Ok(text.trim().to_string())
}

/// Moves decrypted files from `staging` into `output_dir`, all or none.
fn commit(
    staging: &Path,
    output_dir: &Path,
    payload: &[(String, String)],
) -> PackagerResult<Vec<PathBuf>> {
    let moves: Vec<_> = payload
        .iter()
        .map(|(_, original)| (staging.join(original), output_dir.join(original)))
        .collect();
    commit_all(output_dir, &moves)
}

fn stage(stage: UnpackStage, count: usize) {
    debug!(stage = ?stage, count, "Unpack stage reached");
}

/// Lists entry names of an archive without extracting or decrypting.
pub fn entry_names(archive: &Path) -> PackagerResult<Vec<String>> {
    let mut names = ArchiveReader::open(archive)?.entry_names();
    names.sort();
    Ok(names)
}
