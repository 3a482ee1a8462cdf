//! Removal of record files that no longer correspond to a database entry.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::fs::{CatalogFs, TreeSnapshot};
use crate::lint::read_database;
use crate::record::{derive_path, Record};

/// Files in `snapshot` whose path is not the canonical path of any entry.
///
/// Only entries with a non-empty `type` and non-null `category`, `number`
/// and `name` contribute an expected path.
pub fn find_orphans(snapshot: &TreeSnapshot, entries: &[Value]) -> Vec<PathBuf> {
    let expected: BTreeSet<PathBuf> = entries
        .iter()
        .filter(|entry| has_identity(entry))
        .filter_map(|entry| Record::from_value(entry.clone()).ok())
        .map(|record| derive_path(&record).under(snapshot.root()))
        .collect();

    snapshot
        .paths()
        .filter(|path| !expected.contains(*path))
        .map(Path::to_path_buf)
        .collect()
}

fn has_identity(entry: &Value) -> bool {
    let type_present = match entry.get("type") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };
    type_present
        && ["category", "number", "name"]
            .iter()
            .all(|key| entry.get(*key).is_some_and(|v| !v.is_null()))
}

/// Deletes orphaned record files under `root`, judged against the
/// consolidated database at `dist`.
///
/// With `dry_run` nothing is deleted. Returns the orphaned paths either way.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `dist` does not exist.
/// - [`CoreError::InvalidJson`] / [`CoreError::NotAnArray`] if `dist` is not a JSON array.
/// - An I/O variant if a deletion fails.
pub fn remove_orphans<F: CatalogFs + ?Sized>(
    fs: &mut F,
    root: &Path,
    dist: &Path,
    dry_run: bool,
) -> CoreResult<Vec<PathBuf>> {
    let entries = read_database(&*fs, dist)?;
    let snapshot = TreeSnapshot::capture(&*fs, root);
    let orphans = find_orphans(&snapshot, &entries);

    for path in &orphans {
        if dry_run {
            tracing::info!("would remove {}", path.display());
            continue;
        }
        fs.remove_file(path)
            .map_err(|e| CoreError::from_io(path, e))?;
        tracing::info!("removed {}", path.display());
    }

    Ok(orphans)
}
