//! Finds changeset files on disk.
//!
//! Discovery walks a migrations directory, parses every `.sql` file it finds
//! and returns the changesets sorted by their timestamp. Files and
//! directories whose name starts with `_` are ignored together with
//! everything beneath them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sqlshift_core::{ShiftError, ShiftResult};

use crate::changeset::Changeset;

const SQL_SUFFIX: &str = ".sql";
const EXCLUDE_PREFIX: char = '_';

/// Discovers the changesets under `root`.
///
/// A root that does not exist yields an empty list. With `recursive` unset
/// only the root's immediate entries are inspected. One malformed file
/// aborts the whole scan, as does the same file name appearing in two
/// subdirectories ([`ShiftError::DuplicateFile`]).
pub fn discover(root: impl AsRef<Path>, recursive: bool) -> ShiftResult<Vec<Changeset>> {
    let root = root.as_ref();
    if !root.exists() {
        tracing::debug!("Migrations directory {} does not exist", root.display());
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    collect(root, recursive, &mut found)?;

    let mut seen = HashSet::new();
    let mut changesets = Vec::with_capacity(found.len());
    for path in &found {
        let changeset = Changeset::parse(path)?;
        check_unique(&mut seen, &changeset)?;
        changesets.push(changeset);
    }
    sort_changesets(&mut changesets);

    tracing::debug!(
        "Discovered {} changeset(s) in {}",
        changesets.len(),
        root.display()
    );
    Ok(changesets)
}

/// Discovers the changesets of several roots and merges them.
///
/// The same version appearing under two roots is a
/// [`ShiftError::DuplicateFile`].
pub fn discover_all<P: AsRef<Path>>(roots: &[P], recursive: bool) -> ShiftResult<Vec<Changeset>> {
    let mut seen = HashSet::new();
    let mut all = Vec::new();

    for root in roots {
        for changeset in discover(root, recursive)? {
            check_unique(&mut seen, &changeset)?;
            all.push(changeset);
        }
    }

    sort_changesets(&mut all);
    Ok(all)
}

/// Parses explicitly named changeset files from `dir`.
///
/// Names are bare file names. A name with no file is a
/// [`ShiftError::MissingFile`].
pub fn changesets_from<S: AsRef<str>>(
    dir: impl AsRef<Path>,
    file_names: &[S],
) -> ShiftResult<Vec<Changeset>> {
    let dir = dir.as_ref();
    file_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let path = dir.join(name);
            if !path.is_file() {
                return Err(ShiftError::MissingFile(name.to_string()));
            }
            Changeset::parse(path)
        })
        .collect()
}

/// Records `changeset`'s version, failing if it was already seen.
fn check_unique(seen: &mut HashSet<String>, changeset: &Changeset) -> ShiftResult<()> {
    if seen.insert(changeset.version.clone()) {
        Ok(())
    } else {
        Err(ShiftError::DuplicateFile(changeset.path.clone()))
    }
}

/// Sorts by timestamp, keeping discovery order for equal timestamps.
fn sort_changesets(changesets: &mut [Changeset]) {
    changesets.sort_by_key(|c| c.timestamp);
}

fn is_excluded(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(EXCLUDE_PREFIX))
}

fn collect(dir: &Path, recursive: bool, found: &mut Vec<PathBuf>) -> ShiftResult<()> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if is_excluded(&path) {
            continue;
        }
        let file_type = std::fs::metadata(&path)?;
        if file_type.is_dir() {
            if recursive {
                collect(&path, recursive, found)?;
            }
        } else if file_type.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(SQL_SUFFIX))
        {
            found.push(path);
        }
    }
    Ok(())
}
