//! Error types for `modeldb-core`.
//!
//! Fallible operations return [`CoreResult<T>`], an alias for
//! `Result<T, CoreError>`. Problems that concern a single record (bad JSON,
//! failed lint rule, rename conflict) are not errors: they are collected as
//! [`crate::Diagnostic`] values so a run can report the whole batch.

use std::path::PathBuf;

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to parse a settings file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Content is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// A record file holds valid JSON that is not a single object.
    #[error("expected a single JSON object (one model entry), not an array or null")]
    NotAnObject,

    /// A consolidated database file does not hold a JSON array.
    #[error("expected a JSON array in {0}")]
    NotAnArray(PathBuf),

    /// The staging directory still holds files from an earlier run.
    #[error("staging directory {0} is not empty; recover or remove its files before renaming")]
    StagingNotEmpty(PathBuf),

    /// Moving a source into the staging directory failed.
    #[error("staging {from} failed (already staged files remain in {scratch}): {source}")]
    Stage {
        from: PathBuf,
        scratch: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Moving a staged file to its target failed.
    #[error("committing {staged} -> {to} failed (staged files remain in {scratch}): {source}")]
    Commit {
        staged: PathBuf,
        to: PathBuf,
        scratch: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rename target appeared on disk between planning and commit.
    #[error("refusing to overwrite existing file: {0}")]
    TargetOccupied(PathBuf),

    /// Content at a rename target differs from what was staged.
    #[error("content mismatch after rename: {0}")]
    IntegrityMismatch(PathBuf),

    /// Malformed records blocked an operation that needs the whole tree.
    #[error("{0} malformed record file(s); nothing written")]
    Malformed(usize),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps an I/O error on `path` to the most specific variant.
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(err),
        }
    }
}

/// Convenience alias used throughout `modeldb-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/file"));
        assert_eq!(err.to_string(), "path not found: /missing/file");
    }

    #[test]
    fn staging_not_empty_names_directory() {
        let err = CoreError::StagingNotEmpty(PathBuf::from("src/.staging"));
        assert!(err.to_string().contains("src/.staging"));
    }

    #[test]
    fn stage_error_mentions_scratch_and_cause() {
        let err = CoreError::Stage {
            from: PathBuf::from("src/a.json"),
            scratch: PathBuf::from("src/.staging"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let msg = err.to_string();
        assert!(msg.contains("src/a.json"));
        assert!(msg.contains("src/.staging"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn malformed_displays_count() {
        assert_eq!(
            CoreError::Malformed(3).to_string(),
            "3 malformed record file(s); nothing written"
        );
    }

    #[test]
    fn from_io_maps_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = CoreError::from_io(Path::new("/x.json"), io_err);
        assert!(matches!(err, CoreError::NotFound(p) if p == Path::new("/x.json")));
    }

    #[test]
    fn from_io_maps_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let err = CoreError::from_io(Path::new("/secret"), io_err);
        assert!(matches!(err, CoreError::PermissionDenied(_)));
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("boom"));
    }
}
