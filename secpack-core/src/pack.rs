//! Packing: encrypt a directory for one recipient.
//!
//! Everything is produced in a staging directory inside the output
//! directory and only moved into place once every step has succeeded. A
//! failure at any point leaves the output directory as it was.

use std::fs;
use std::path::{Path, PathBuf};

use secpack_archive::names::{ciphertext_name, MANIFEST_ENTRY, VENDOR_KEY_ENTRY, WRAPPED_KEY_ENTRY};
use secpack_archive::{ArchiveBuilder, Manifest};
use secpack_crypto::pem::{load_public_key, public_key_to_pem};
use secpack_crypto::{encrypt, wrap_key, KeyRole, SymmetricKey};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commit::commit_all;
use crate::config::PackOptions;
use crate::error::{io_at, PackagerError, PackagerResult};

/// What a successful pack produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackOutcome {
    /// The archive, when zipping was enabled.
    pub archive: Option<PathBuf>,
    /// Loose artifacts left in the output directory, in name order.
    pub artifacts: Vec<PathBuf>,
    /// Original names of the files that were encrypted, in name order.
    pub files: Vec<String>,
}

/// Encrypts every regular file directly inside `options.input_dir`.
///
/// One fresh symmetric key protects all files; it is wrapped for the
/// recipient and never written in the clear.
pub fn pack(options: &PackOptions) -> PackagerResult<PackOutcome> {
    options.validate()?;

    let recipient = load_public_key(&options.recipient_public_key, KeyRole::Recipient)?;
    let vendor_pem = match (&options.vendor_public_key, options.license) {
        (Some(path), true) => {
            let vendor = load_public_key(path, KeyRole::Vendor)?;
            Some(public_key_to_pem(&vendor)?)
        }
        _ => None,
    };

    let inputs = list_inputs(&options.input_dir)?;
    if inputs.is_empty() {
        warn!(dir = %options.input_dir.display(), "Input directory has no files to encrypt");
    }

    fs::create_dir_all(&options.output_dir).map_err(io_at(&options.output_dir))?;
    let staging = tempfile::Builder::new()
        .prefix(".secpack-staging-")
        .tempdir_in(&options.output_dir)
        .map_err(io_at(&options.output_dir))?;

    let key = SymmetricKey::generate();
    let mut files = Vec::with_capacity(inputs.len());
    for (name, path) in &inputs {
        options.cancel.checkpoint("encryption")?;
        let plaintext = fs::read(path).map_err(io_at(path))?;
        let blob = encrypt(&key, &plaintext)?;
        let entry = ciphertext_name(name);
        write_staged(staging.path(), &entry, &blob)?;
        info!(file = %name, entry = %entry, bytes = plaintext.len(), "Encrypted file");
        files.push(name.clone());
    }

    let wrapped = wrap_key(&recipient, &key)?;
    drop(key);
    write_staged(staging.path(), WRAPPED_KEY_ENTRY, &wrapped)?;

    if let Some(pem) = &vendor_pem {
        let manifest = Manifest::license_required();
        write_staged(staging.path(), MANIFEST_ENTRY, &manifest.to_json()?)?;
        write_staged(staging.path(), VENDOR_KEY_ENTRY, pem.as_bytes())?;
        info!("License manifest and vendor key added");
    }

    options.cancel.checkpoint("archiving")?;

    // The archive is built beside the staging area so it never lists itself.
    let bundle = tempfile::Builder::new()
        .prefix(".secpack-archive-")
        .tempdir_in(&options.output_dir)
        .map_err(io_at(&options.output_dir))?;
    let mut moves = Vec::new();
    let archive = if options.zip {
        let target = options.output_dir.join(&options.archive_name);
        moves.push((write_archive(staging.path(), bundle.path(), options)?, target.clone()));
        Some(target)
    } else {
        None
    };
    let keep_artifacts = !options.zip || !options.cleanup;
    if keep_artifacts {
        moves.extend(staged_artifacts(staging.path(), &options.output_dir)?);
    }

    let committed = commit_all(&options.output_dir, &moves)?;
    let artifacts = if keep_artifacts {
        committed.into_iter().skip(usize::from(archive.is_some())).collect()
    } else {
        Vec::new()
    };
    if let Some(path) = &archive {
        info!(path = %path.display(), "Archive created");
    }

    if let Err(e) = bundle.close() {
        warn!(error = %e, "Failed to remove archive build directory");
    }
    if let Err(e) = staging.close() {
        warn!(error = %e, "Failed to remove staging directory");
    }

    info!(
        files = files.len(),
        archive = ?archive,
        artifacts = artifacts.len(),
        "Pack complete"
    );
    Ok(PackOutcome {
        archive,
        artifacts,
        files,
    })
}

/// Regular files directly inside `dir`, sorted by name. Symlinks are
/// followed; a link to a regular file is packed as that file.
fn list_inputs(dir: &Path) -> PackagerResult<Vec<(String, PathBuf)>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_at(dir))? {
        let entry = entry.map_err(io_at(dir))?;
        let path = entry.path();
        let metadata = fs::metadata(&path).map_err(io_at(&path))?;
        if !metadata.is_file() {
            debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }
        let name = entry.file_name().into_string().map_err(|n| {
            PackagerError::Configuration(format!("input file name is not UTF-8: {n:?}"))
        })?;
        inputs.push((name, path));
    }
    inputs.sort();
    Ok(inputs)
}

fn write_staged(staging: &Path, name: &str, data: &[u8]) -> PackagerResult<()> {
    let path = staging.join(name);
    fs::write(&path, data).map_err(io_at(&path))
}

/// Writes the archive of everything staged into `bundle` and returns its path.
fn write_archive(staging: &Path, bundle: &Path, options: &PackOptions) -> PackagerResult<PathBuf> {
    let path = bundle.join(&options.archive_name);
    let builder = ArchiveBuilder::from_staging_dir(staging)?;
    let file = fs::File::create(&path).map_err(io_at(&path))?;
    let file = builder.write_to(file)?;
    file.sync_all().map_err(io_at(&path))?;
    Ok(path)
}

/// Pairs every staged artifact with its place in `output_dir`, in name order.
fn staged_artifacts(staging: &Path, output_dir: &Path) -> PackagerResult<Vec<(PathBuf, PathBuf)>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(staging).map_err(io_at(staging))? {
        names.push(entry.map_err(io_at(staging))?.file_name());
    }
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| (staging.join(&name), output_dir.join(&name)))
        .collect())
}
