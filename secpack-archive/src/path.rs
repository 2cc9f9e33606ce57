//! Entry-name validation (zip-slip defense).

use std::path::PathBuf;

use crate::{ArchiveError, ArchiveResult};

/// Resolves an entry name to a relative path that cannot leave the
/// extraction root.
///
/// Backslashes count as separators. Absolute paths, drive prefixes, `..`
/// components and NUL bytes are rejected; `.` and empty components are
/// dropped.
pub fn safe_entry_path(name: &str) -> ArchiveResult<PathBuf> {
    let unsafe_path = || ArchiveError::UnsafePath(name.to_string());

    if name.is_empty() || name.contains('\0') {
        return Err(unsafe_path());
    }
    let normalized = name.replace('\\', "/");
    if normalized.starts_with('/') {
        return Err(unsafe_path());
    }
    let bytes = normalized.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(unsafe_path());
    }

    let mut path = PathBuf::new();
    for component in normalized.split('/') {
        match component {
            "" | "." => continue,
            ".." => return Err(unsafe_path()),
            c => path.push(c),
        }
    }
    if path.as_os_str().is_empty() {
        return Err(unsafe_path());
    }
    Ok(path)
}
