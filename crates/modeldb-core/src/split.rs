//! One-time migration from a consolidated database to the per-record tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::diagnostic::Diagnostic;
use crate::error::{CoreError, CoreResult};
use crate::fs::CatalogFs;
use crate::lint::read_database;
use crate::record::{derive_path, Record};

/// Outcome of [`split_database`].
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    /// Files written, in database order.
    pub written: Vec<PathBuf>,
    /// Entries that were skipped, labelled `[index]`.
    pub skipped: Vec<Diagnostic>,
}

/// Writes every entry of the array at `source` to its canonical path under `root`.
///
/// Entries that share a path within one run get `-2`, `-3`, ... appended to
/// the later files' stems.
///
/// # Errors
///
/// Fails if `source` cannot be read as a JSON array or a write fails.
pub fn split_database<F: CatalogFs + ?Sized>(
    fs: &mut F,
    source: &Path,
    root: &Path,
) -> CoreResult<SplitReport> {
    let entries = read_database(&*fs, source)?;
    let mut report = SplitReport::default();
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let subject = format!("[{index}]");
        if let Some(field) = missing_identity(&entry) {
            tracing::warn!("{subject} skipping entry without \"{field}\"");
            report.skipped.push(Diagnostic::new(
                subject,
                format!("skipping entry missing \"{field}\""),
            ));
            continue;
        }
        let record = match Record::from_value(entry) {
            Ok(record) => record,
            Err(e) => {
                report.skipped.push(Diagnostic::new(subject, e.to_string()));
                continue;
            }
        };

        let location = derive_path(&record);
        if let Some(field) = location.degenerate_field() {
            tracing::warn!("{subject} skipping entry whose \"{field}\" slugs to nothing");
            report.skipped.push(Diagnostic::new(
                subject,
                format!("cannot derive canonical path: \"{field}\" slugs to nothing"),
            ));
            continue;
        }

        let canonical = location.under(root);
        let count = seen.entry(canonical.clone()).or_insert(0);
        *count += 1;
        let target = if *count > 1 {
            let suffixed = with_suffix(&canonical, *count);
            tracing::warn!(
                "{subject} {} already written this run, using {}",
                canonical.display(),
                suffixed.display()
            );
            suffixed
        } else {
            canonical
        };

        let dir = root.join(&location.directory);
        fs.create_dir_all(&dir)
            .map_err(|e| CoreError::from_io(&dir, e))?;
        fs.write(&target, &record.to_pretty_json())
            .map_err(|e| CoreError::from_io(&target, e))?;
        tracing::debug!("wrote {}", target.display());
        report.written.push(target);
    }

    tracing::info!(
        "wrote {} entries to {}, skipped {}",
        report.written.len(),
        root.display(),
        report.skipped.len()
    );
    Ok(report)
}

/// First identity field that is absent, null or an empty string.
fn missing_identity(entry: &Value) -> Option<&'static str> {
    ["type", "category", "number", "name"]
        .into_iter()
        .find(|key| match entry.get(*key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        })
}

/// `dir/stem.json` -> `dir/stem-{n}.json`
fn with_suffix(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}-{n}.json"))
}
