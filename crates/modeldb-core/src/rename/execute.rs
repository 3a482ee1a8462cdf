//! Two-phase rename execution.
//!
//! Every source is first moved into a scratch directory, then every staged
//! file is moved to its target. No target is touched until all sources have
//! left their original paths, so chains and cycles (A→B→C→A) cannot overwrite
//! each other. On failure the already staged files stay in the scratch
//! directory for recovery; nothing is deleted.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::plan::RenameMove;
use crate::error::{CoreError, CoreResult};
use crate::fs::CatalogFs;

/// Name of the scratch directory created under the tree root.
pub const STAGING_DIR_NAME: &str = ".staging";

/// A move that was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub from: PathBuf,
    pub to: PathBuf,
    /// SHA-256 hex digest of the moved content, verified at the target.
    pub sha256: String,
}

/// Applies `moves` using `scratch` as the staging directory.
///
/// # Errors
///
/// - [`CoreError::StagingNotEmpty`] if `scratch` already holds files.
/// - [`CoreError::NotFound`] / [`CoreError::Io`] if a source can't be read
///   (nothing has moved yet at that point).
/// - [`CoreError::Stage`] if moving a source into `scratch` fails.
/// - [`CoreError::Commit`] if moving a staged file to its target fails.
/// - [`CoreError::TargetOccupied`] if a target exists at commit time.
/// - [`CoreError::IntegrityMismatch`] if a target's content differs from the source's.
pub fn execute_renames<F: CatalogFs + ?Sized>(
    fs: &mut F,
    scratch: &Path,
    moves: &[RenameMove],
) -> CoreResult<Vec<AppliedMove>> {
    if moves.is_empty() {
        return Ok(Vec::new());
    }

    let mut digests = Vec::with_capacity(moves.len());
    for mv in moves {
        let content = fs
            .read_to_string(&mv.from)
            .map_err(|e| CoreError::from_io(&mv.from, e))?;
        digests.push(content_digest(&content));
    }

    if fs.exists(scratch) {
        let leftovers = fs.read_dir(scratch).map_err(|e| CoreError::from_io(scratch, e))?;
        if !leftovers.is_empty() {
            return Err(CoreError::StagingNotEmpty(scratch.to_path_buf()));
        }
    } else {
        fs.create_dir_all(scratch)
            .map_err(|e| CoreError::from_io(scratch, e))?;
    }

    // Phase 1: vacate every source.
    let mut staged = Vec::with_capacity(moves.len());
    for (index, mv) in moves.iter().enumerate() {
        let basename = mv
            .from
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = scratch.join(format!("{index}-{basename}"));
        fs.rename(&mv.from, &temp).map_err(|source| CoreError::Stage {
            from: mv.from.clone(),
            scratch: scratch.to_path_buf(),
            source,
        })?;
        tracing::debug!("staged {} as {}", mv.from.display(), temp.display());
        staged.push(temp);
    }

    // Phase 2: fill every target.
    let mut applied = Vec::with_capacity(moves.len());
    for ((mv, temp), digest) in moves.iter().zip(&staged).zip(digests) {
        let commit_err = |source| CoreError::Commit {
            staged: temp.clone(),
            to: mv.to.clone(),
            scratch: scratch.to_path_buf(),
            source,
        };

        if let Some(parent) = mv.to.parent() {
            fs.create_dir_all(parent).map_err(commit_err)?;
        }
        if fs.exists(&mv.to) {
            return Err(CoreError::TargetOccupied(mv.to.clone()));
        }
        fs.rename(temp, &mv.to).map_err(commit_err)?;

        let written = fs
            .read_to_string(&mv.to)
            .map_err(|e| CoreError::from_io(&mv.to, e))?;
        if content_digest(&written) != digest {
            return Err(CoreError::IntegrityMismatch(mv.to.clone()));
        }

        tracing::info!("moved {} -> {}", mv.from.display(), mv.to.display());
        applied.push(AppliedMove {
            from: mv.from.clone(),
            to: mv.to.clone(),
            sha256: digest,
        });
    }

    if let Err(e) = fs.remove_dir(scratch) {
        tracing::warn!("could not remove staging directory {}: {e}", scratch.display());
    }

    Ok(applied)
}

fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
