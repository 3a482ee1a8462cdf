//! Human-readable reports. Results go to stdout, problems to stderr.

use std::path::{Path, PathBuf};

use modeldb_core::split::SplitReport;
use modeldb_core::{Diagnostic, FixMode, FixReport};

pub fn print_fix(report: &FixReport, mode: FixMode) {
    for conflict in &report.conflicts {
        eprintln!("{conflict}");
    }
    for diag in &report.diagnostics {
        eprintln!("{diag}");
    }

    if mode != FixMode::SchemaOnly {
        if mode == FixMode::DryRun {
            for mv in &report.planned {
                println!("{mv}");
            }
            if !report.planned.is_empty() {
                println!("Dry run: no files moved.");
            }
        } else {
            for applied in &report.applied {
                println!("Moved: {} -> {}", applied.from.display(), applied.to.display());
            }
        }
        if report.planned.is_empty() && report.conflicts.is_empty() {
            println!("No path fixes needed.");
        }
    }

    if matches!(mode, FixMode::Full | FixMode::SchemaOnly) {
        if report.schema_fixed.is_empty() {
            println!("No schema fixes needed.");
        } else {
            println!("Schema: fixed {} file(s).", report.schema_fixed.len());
        }
    }
}

/// `checked` is the number of files examined, when known.
pub fn print_lint(diags: &[Diagnostic], checked: Option<usize>) {
    for diag in diags {
        eprintln!("{diag}");
    }
    match (diags.is_empty(), checked) {
        (true, Some(n)) => println!("All {n} file(s) passed lint."),
        (true, None) => println!("Lint passed."),
        (false, _) => eprintln!("Lint failed: {} problem(s).", diags.len()),
    }
}

pub fn print_orphans(orphans: &[PathBuf], dry_run: bool) {
    let verb = if dry_run { "Would remove" } else { "Removed" };
    for path in orphans {
        println!("{verb}: {}", path.display());
    }
    if orphans.is_empty() {
        println!("No orphan files to remove.");
    } else {
        println!("{verb} {} orphan file(s).", orphans.len());
    }
}

pub fn print_split(report: &SplitReport, root: &Path) {
    for diag in &report.skipped {
        eprintln!("{diag}");
    }
    println!("Wrote {} entries to {}", report.written.len(), root.display());
    if !report.skipped.is_empty() {
        println!("Skipped {} entries.", report.skipped.len());
    }
}
