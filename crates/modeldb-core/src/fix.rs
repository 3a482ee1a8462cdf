//! Fix runs: canonical paths first, then canonical schema.

use std::path::{Path, PathBuf};

use crate::config::settings::Settings;
use crate::diagnostic::{push_unique, Diagnostic};
use crate::error::{CoreError, CoreResult};
use crate::fs::{is_within, lexical_clean, CatalogFs, TreeSnapshot};
use crate::record::normalize;
use crate::rename::{
    execute_renames, plan_renames, AppliedMove, RenameConflict, RenameMove, STAGING_DIR_NAME,
};

/// Which phases a fix run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixMode {
    /// Move files, then normalize their content.
    #[default]
    Full,
    /// Move files only.
    PathsOnly,
    /// Normalize content in place; nothing moves.
    SchemaOnly,
    /// Plan moves and report them; nothing is written.
    DryRun,
}

impl FixMode {
    /// `dry_run` wins over the other flags.
    pub fn from_flags(dry_run: bool, paths_only: bool, schema_only: bool) -> Self {
        if dry_run {
            FixMode::DryRun
        } else if paths_only {
            FixMode::PathsOnly
        } else if schema_only {
            FixMode::SchemaOnly
        } else {
            FixMode::Full
        }
    }

    fn fixes_paths(self) -> bool {
        !matches!(self, FixMode::SchemaOnly)
    }

    fn fixes_schema(self) -> bool {
        matches!(self, FixMode::Full | FixMode::SchemaOnly)
    }
}

/// What a fix run did, or would do for [`FixMode::DryRun`].
#[derive(Debug, Clone, Default)]
pub struct FixReport {
    /// Safe moves found by the planner.
    pub planned: Vec<RenameMove>,
    /// Moves actually committed.
    pub applied: Vec<AppliedMove>,
    pub conflicts: Vec<RenameConflict>,
    pub diagnostics: Vec<Diagnostic>,
    /// Files rewritten by the schema phase.
    pub schema_fixed: Vec<PathBuf>,
}

impl FixReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.diagnostics.is_empty()
    }
}

/// Runs a fix over the record tree at `root`.
///
/// `files` restricts the run to those record files; `None` means every JSON
/// file under `root`. Explicit files outside `root` or without a `.json`
/// extension are skipped and reported as diagnostics. The planner always
/// sees the whole tree so occupancy checks are complete.
///
/// # Errors
///
/// - [`CoreError::NotADirectory`] if `root` is a file.
/// - Executor failures ([`CoreError::Stage`], [`CoreError::Commit`],
///   [`CoreError::StagingNotEmpty`] and the like) and schema write failures.
///
/// Per-file problems end up in [`FixReport::diagnostics`] instead.
pub fn run_fix<F: CatalogFs + ?Sized>(
    fs: &mut F,
    root: &Path,
    files: Option<&[PathBuf]>,
    settings: &Settings,
    mode: FixMode,
) -> CoreResult<FixReport> {
    let root = &lexical_clean(root);
    if fs.exists(root) && !fs.is_dir(root) {
        return Err(CoreError::NotADirectory(root.clone()));
    }
    let mut report = FixReport::default();
    let selected = files.map(|files| select_files(root, files, &mut report.diagnostics));

    if mode.fixes_paths() {
        let snapshot = TreeSnapshot::capture(&*fs, root);
        let candidates: Vec<PathBuf> = match &selected {
            Some(paths) => paths.clone(),
            None => snapshot.paths().map(Path::to_path_buf).collect(),
        };
        let plan = plan_renames(&snapshot, &candidates);
        report.conflicts = plan.conflicts;
        report.diagnostics.extend(plan.diagnostics);
        report.planned = plan.moves;

        if mode == FixMode::DryRun {
            for mv in &report.planned {
                tracing::info!("would move {mv}");
            }
        } else {
            let scratch = root.join(STAGING_DIR_NAME);
            report.applied = execute_renames(fs, &scratch, &report.planned)?;
        }
    }

    if mode.fixes_schema() {
        // Moved files have new paths, so a run that moved anything re-walks the tree.
        let (snapshot, targets) = match &selected {
            Some(paths) if report.applied.is_empty() => {
                (TreeSnapshot::capture_paths(&*fs, root, paths), paths.clone())
            }
            _ => {
                let snapshot = TreeSnapshot::capture(&*fs, root);
                let all = snapshot.paths().map(Path::to_path_buf).collect();
                (snapshot, all)
            }
        };
        fix_schema(fs, &snapshot, &targets, settings, &mut report)?;
    }

    Ok(report)
}

fn fix_schema<F: CatalogFs + ?Sized>(
    fs: &mut F,
    snapshot: &TreeSnapshot,
    targets: &[PathBuf],
    settings: &Settings,
    report: &mut FixReport,
) -> CoreResult<()> {
    for path in targets {
        let record = match snapshot.load_record(path) {
            Ok(record) => record,
            Err(diag) => {
                let message = diag.to_string();
                if push_unique(&mut report.diagnostics, diag) {
                    tracing::warn!("{message}");
                }
                continue;
            }
        };

        let normalized = normalize(&record, settings);
        if normalized.same_layout(&record) {
            tracing::debug!("{} already normalized", path.display());
            continue;
        }

        fs.write(path, &normalized.to_pretty_json())
            .map_err(|e| CoreError::from_io(path, e))?;
        tracing::info!("normalized {}", path.display());
        report.schema_fixed.push(path.clone());
    }
    Ok(())
}

/// Keeps the `.json` paths that lie inside `root`, lexically cleaned.
/// Every other entry becomes a diagnostic.
fn select_files(root: &Path, files: &[PathBuf], diags: &mut Vec<Diagnostic>) -> Vec<PathBuf> {
    let mut selected = Vec::with_capacity(files.len());
    for file in files {
        let cleaned = lexical_clean(file);
        let skipped = if !cleaned.extension().is_some_and(|ext| ext == "json") {
            Some("not a .json file".to_string())
        } else if !is_within(root, &cleaned) {
            Some(format!("outside {}", root.display()))
        } else {
            None
        };
        match skipped {
            Some(reason) => {
                tracing::warn!("ignoring {}: {reason}", file.display());
                push_unique(diags, Diagnostic::for_path(file, format!("ignored: {reason}")));
            }
            None if !selected.contains(&cleaned) => selected.push(cleaned),
            None => {}
        }
    }
    selected
}
