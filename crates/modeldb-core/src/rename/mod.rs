//! Collision-safe bulk renames.
//!
//! [`plan_renames`] decides which files move where and refuses anything that
//! could lose data; [`execute_renames`] applies the plan through a staging
//! directory so overlapping moves are safe.

pub mod execute;
pub mod plan;

pub use execute::{execute_renames, AppliedMove, STAGING_DIR_NAME};
pub use plan::{plan_renames, ConflictKind, RenameConflict, RenameMove, RenamePlan};
