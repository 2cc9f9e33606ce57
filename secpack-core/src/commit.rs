//! Moves staged files into the output directory as a single unit.
//!
//! Either every file lands at its target or the output directory is left as
//! it was. Files that a move replaces are parked in a scratch directory and
//! put back if a later move fails.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{io_at, PackagerError, PackagerResult};

struct Applied<'a> {
    from: &'a Path,
    to: &'a Path,
    replaced: Option<PathBuf>,
}

/// Renames each `(from, to)` pair. All targets must live in `output_dir`.
///
/// A target occupied by a directory fails the whole commit before anything
/// is moved.
pub(crate) fn commit_all(
    output_dir: &Path,
    moves: &[(PathBuf, PathBuf)],
) -> PackagerResult<Vec<PathBuf>> {
    for (_, to) in moves {
        if to.is_dir() {
            return Err(PackagerError::Io {
                path: to.clone(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a directory occupies the target path",
                ),
            });
        }
    }

    let parked = tempfile::Builder::new()
        .prefix(".secpack-replaced-")
        .tempdir_in(output_dir)
        .map_err(io_at(output_dir))?;

    let mut applied = Vec::with_capacity(moves.len());
    for (i, (from, to)) in moves.iter().enumerate() {
        let park = parked.path().join(i.to_string());
        match move_one(from, to, &park) {
            Ok(replaced) => applied.push(Applied { from, to, replaced }),
            Err(e) => {
                roll_back(&applied);
                return Err(e);
            }
        }
    }

    debug!(count = applied.len(), "Committed staged files");
    Ok(moves.iter().map(|(_, to)| to.clone()).collect())
}

/// Returns where the previous occupant of `to` was parked, if there was one.
fn move_one(from: &Path, to: &Path, park: &Path) -> PackagerResult<Option<PathBuf>> {
    let replaced = if fs::symlink_metadata(to).is_ok() {
        fs::rename(to, park).map_err(io_at(to))?;
        Some(park.to_path_buf())
    } else {
        None
    };

    if let Err(e) = fs::rename(from, to) {
        if let Some(park) = &replaced {
            restore(park, to);
        }
        return Err(io_at(to)(e));
    }
    Ok(replaced)
}

fn roll_back(applied: &[Applied<'_>]) {
    for step in applied.iter().rev() {
        if let Err(e) = fs::rename(step.to, step.from) {
            warn!(path = %step.to.display(), error = %e, "Failed to withdraw committed file");
            continue;
        }
        if let Some(park) = &step.replaced {
            restore(park, step.to);
        }
    }
}

fn restore(park: &Path, to: &Path) {
    if let Err(e) = fs::rename(park, to) {
        warn!(path = %to.display(), error = %e, "Failed to restore replaced file");
    }
}
