//! Building and extracting package archives.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::manifest::Manifest;
use crate::names::{original_name, MANIFEST_ENTRY};
use crate::path::safe_entry_path;
use crate::{ArchiveError, ArchiveResult};

/// Collects flat files and writes them into a deterministic zip container.
///
/// Entries are written in name order with a fixed timestamp, so identical
/// inputs produce identical archives.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: BTreeMap<String, PathBuf>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every regular file directly inside `dir`. Subdirectories are skipped.
    pub fn from_staging_dir(dir: &Path) -> ArchiveResult<Self> {
        let mut builder = Self::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().into_string().map_err(|n| {
                ArchiveError::Invalid(format!("non UTF-8 file name in staging area: {n:?}"))
            })?;
            builder = builder.add_file(&name, entry.path())?;
        }
        Ok(builder)
    }

    /// Adds `path` under entry name `name`.
    pub fn add_file(mut self, name: &str, path: PathBuf) -> ArchiveResult<Self> {
        safe_entry_path(name)?;
        if self.entries.insert(name.to_string(), path).is_some() {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }
        Ok(self)
    }

    /// Entry names in the order they will be written.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Writes the archive into `writer` and returns it.
    pub fn write_to<W: Write + Seek>(self, writer: W) -> ArchiveResult<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        for (name, path) in &self.entries {
            let mut source = File::open(path)?;
            zip.start_file(name.as_str(), options)?;
            std::io::copy(&mut source, &mut zip)?;
            debug!(entry = %name, "Added archive entry");
        }

        Ok(zip.finish()?)
    }
}

/// An opened package archive.
pub struct ArchiveReader<R> {
    archive: ZipArchive<R>,
}

impl ArchiveReader<File> {
    /// Opens an archive file.
    pub fn open(path: &Path) -> ArchiveResult<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Parses the container directory of `reader`.
    pub fn new(reader: R) -> ArchiveResult<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Raw entry names as stored, without extracting anything.
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Extracts every entry under `dest`.
    ///
    /// All names are validated before the first byte is written; a single
    /// unsafe or duplicate name aborts the whole extraction.
    pub fn extract_to(&mut self, dest: &Path) -> ArchiveResult<ExtractedArchive> {
        let mut planned = Vec::with_capacity(self.archive.len());
        let mut seen = BTreeSet::new();
        for i in 0..self.archive.len() {
            let file = self.archive.by_index_raw(i)?;
            let name = file.name().to_string();
            let relative = safe_entry_path(&name)?;
            if !seen.insert(relative.clone()) {
                return Err(ArchiveError::DuplicateEntry(name));
            }
            planned.push((i, name, relative, file.is_dir()));
        }

        let mut files = Vec::new();
        for (i, name, relative, is_dir) in planned {
            let target = dest.join(&relative);
            if is_dir {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut entry = self.archive.by_index(i)?;
            let mut out = File::create(&target)?;
            std::io::copy(&mut entry, &mut out)?;
            debug!(entry = %name, "Extracted archive entry");
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }

        Ok(ExtractedArchive {
            root: dest.to_path_buf(),
            files,
        })
    }
}

/// Files of an archive after extraction.
#[derive(Debug, Clone)]
pub struct ExtractedArchive {
    root: PathBuf,
    files: Vec<String>,
}

impl ExtractedArchive {
    /// Relative paths of every extracted file, `/`-separated.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Returns true if a file entry named `name` was extracted.
    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    /// Filesystem path of entry `name`, if it was extracted.
    pub fn path_of(&self, name: &str) -> Option<PathBuf> {
        self.contains(name).then(|| self.root.join(name))
    }

    /// Reads entry `name`, failing with [`ArchiveError::MissingEntry`] if absent.
    pub fn read(&self, name: &str) -> ArchiveResult<Vec<u8>> {
        let path = self
            .path_of(name)
            .ok_or_else(|| ArchiveError::MissingEntry(name.to_string()))?;
        Ok(fs::read(path)?)
    }

    /// Parses the manifest entry if the archive carries one.
    pub fn manifest(&self) -> ArchiveResult<Option<Manifest>> {
        if !self.contains(MANIFEST_ENTRY) {
            return Ok(None);
        }
        Manifest::from_json(&self.read(MANIFEST_ENTRY)?).map(Some)
    }

    /// Top-level ciphertext entries in name order, paired with their original names.
    pub fn payload_entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .files
            .iter()
            .filter(|f| !f.contains('/'))
            .filter_map(|f| original_name(f).map(|orig| (f.clone(), orig.to_string())))
            .collect();
        entries.sort();
        entries
    }
}
