//! modeldb: maintenance tool for the model catalog record tree.
//!
//! Parses the command line, loads settings once, runs one library
//! operation and maps its report to the exit status.

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modeldb_core::fs::lexical_clean;
use modeldb_core::{DiskFs, FixMode, Settings, TreeSnapshot};

#[derive(Parser, Debug)]
#[command(name = "modeldb", version, about = "Keep the model catalog record tree canonical")]
struct Cli {
    /// Repository root (records under <repo>/src, artifact under <repo>/dist)
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    repo: PathBuf,

    /// Settings file (default: <repo>/lint-settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move files to their canonical paths, then normalize their fields
    Fix(FixArgs),
    /// Validate record files
    Lint {
        /// Files to check (default: every record file)
        files: Vec<PathBuf>,
    },
    /// Validate a consolidated database file
    LintDb {
        /// Database to check (default: <repo>/dist/Model-Database.json)
        path: Option<PathBuf>,
    },
    /// Consolidate the record tree into <repo>/dist/Model-Database.json
    Build,
    /// Delete record files that have no entry in the built database
    RemoveOrphans {
        /// List orphans without deleting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Split a consolidated database into the record tree
    Split {
        /// Source database (default: <repo>/Model-Database.json)
        source: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct FixArgs {
    /// Only report renames; write nothing
    #[arg(long)]
    dry_run: bool,
    /// Only fix folders and filenames
    #[arg(long, conflicts_with = "schema_only")]
    paths_only: bool,
    /// Only fix fields; move nothing
    #[arg(long)]
    schema_only: bool,
    /// Files to fix (default: every record file)
    files: Vec<PathBuf>,
}

impl Cli {
    /// Absolute repository root, so absolute file arguments compare against it.
    fn repo_dir(&self) -> PathBuf {
        match std::path::absolute(&self.repo) {
            Ok(abs) => lexical_clean(&abs),
            Err(e) => {
                tracing::warn!("cannot resolve {}: {e}", self.repo.display());
                lexical_clean(&self.repo)
            }
        }
    }

    fn src_dir(&self) -> PathBuf {
        self.repo_dir().join("src")
    }

    fn dist_file(&self) -> PathBuf {
        self.repo_dir().join("dist").join("Model-Database.json")
    }

    fn settings_file(&self) -> PathBuf {
        self.settings
            .clone()
            .unwrap_or_else(|| self.repo_dir().join("lint-settings.json"))
    }

    /// Relative file arguments are taken relative to the repository root.
    fn resolve(&self, files: &[PathBuf]) -> Vec<PathBuf> {
        let repo = self.repo_dir();
        files.iter().map(|f| resolve_against(&repo, f)).collect()
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        lexical_clean(path)
    } else {
        lexical_clean(&base.join(path))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modeldb=info,modeldb_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let clean = run(&cli)?;
    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs the selected command. `Ok(false)` means problems were reported.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut fs = DiskFs;
    let root = cli.src_dir();
    tracing::debug!("record tree at {}", root.display());

    match &cli.command {
        Commands::Fix(args) => {
            let settings = Settings::load_or_default(&cli.settings_file());
            let mode = FixMode::from_flags(args.dry_run, args.paths_only, args.schema_only);
            let files = cli.resolve(&args.files);
            tracing::debug!(?files, ?mode, "fix selection");
            let selection = (!files.is_empty()).then_some(files.as_slice());
            let report = modeldb_core::run_fix(&mut fs, &root, selection, &settings, mode)?;
            output::print_fix(&report, mode);
            Ok(report.is_clean())
        }
        Commands::Lint { files } => {
            let settings = Settings::load_or_default(&cli.settings_file());
            let snapshot = TreeSnapshot::capture(&fs, &root);
            let files = cli.resolve(files);
            let selection = (!files.is_empty()).then_some(files.as_slice());
            let checked = selection.map_or(snapshot.len(), <[PathBuf]>::len);
            let diags = modeldb_core::lint_tree(&snapshot, selection, &settings);
            output::print_lint(&diags, Some(checked));
            Ok(diags.is_empty())
        }
        Commands::LintDb { path } => {
            let settings = Settings::load_or_default(&cli.settings_file());
            let path = path
                .as_ref()
                .map(|p| resolve_against(&cli.repo_dir(), p))
                .unwrap_or_else(|| cli.dist_file());
            let diags = modeldb_core::lint_database(&fs, &path, &settings)?;
            output::print_lint(&diags, None);
            Ok(diags.is_empty())
        }
        Commands::Build => {
            let dist = cli.dist_file();
            let count = modeldb_core::build_database(&mut fs, &root, &dist)?;
            println!("Built {} ({count} entries).", dist.display());
            Ok(true)
        }
        Commands::RemoveOrphans { dry_run } => {
            let orphans =
                modeldb_core::remove_orphans(&mut fs, &root, &cli.dist_file(), *dry_run)?;
            output::print_orphans(&orphans, *dry_run);
            Ok(true)
        }
        Commands::Split { source } => {
            let source = source
                .as_ref()
                .map(|p| resolve_against(&cli.repo_dir(), p))
                .unwrap_or_else(|| cli.repo_dir().join("Model-Database.json"));
            let report = modeldb_core::split_database(&mut fs, &source, &root)?;
            output::print_split(&report, &root);
            Ok(true)
        }
    }
}
