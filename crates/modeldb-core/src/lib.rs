//! modeldb core library: canonicalization engine for the model catalog.
//!
//! `modeldb-core` keeps a tree of one-JSON-object-per-product record files
//! in canonical shape: every file sits at a path derived from its own
//! content and carries its fields in a fixed order. It is independent of
//! any front end; the `modeldb` CLI is a thin layer over it.
//!
//! # Modules
//!
//! - [`slug`](mod@slug): Deterministic text-to-path-segment transform.
//! - [`record`]: [`Record`] model, canonical path derivation and schema normalization.
//! - [`rename`]: Rename planner (conflicts, occupancy) and two-phase staged executor.
//! - [`fix`]: Fix runs combining the rename and schema phases.
//! - [`lint`]: Field and layout validation.
//! - [`build`]: Consolidation of the tree into a single sorted database file.
//! - [`orphans`]: Removal of files without a database entry.
//! - [`split`]: Migration from a consolidated database to the per-record tree.
//! - [`fs`]: File system seam ([`CatalogFs`]) and [`TreeSnapshot`].
//! - [`config`]: Lint and normalization [`Settings`].
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod build;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod fix;
pub mod fs;
pub mod lint;
pub mod orphans;
pub mod record;
pub mod rename;
pub mod slug;
pub mod split;

pub use build::{build_database, consolidate};
pub use config::settings::Settings;
pub use diagnostic::Diagnostic;
pub use error::{CoreError, CoreResult};
pub use fix::{run_fix, FixMode, FixReport};
pub use fs::{walk_json, CatalogFs, DiskFs, MemoryFs, TreeSnapshot};
pub use lint::{lint_database, lint_entry, lint_file, lint_tree};
pub use orphans::{find_orphans, remove_orphans};
pub use record::{derive_path, normalize, CanonicalLocation, Record, CANONICAL_KEYS};
pub use rename::{
    execute_renames, plan_renames, AppliedMove, ConflictKind, RenameConflict, RenameMove,
    RenamePlan,
};
pub use slug::slug;
pub use split::{split_database, SplitReport};
