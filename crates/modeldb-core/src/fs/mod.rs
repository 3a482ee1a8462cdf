//! File system abstractions for the record tree.
//!
//! Everything that touches files goes through [`CatalogFs`], so the planner,
//! executor and maintenance operations run the same way against the real disk
//! ([`DiskFs`]) and against an in-memory tree ([`MemoryFs`]) in tests.
//! [`TreeSnapshot`] captures the tree once so planning is a pure function of it.

pub mod disk;
pub mod memory;
pub mod snapshot;

use std::io;
use std::path::{Component, Path, PathBuf};

pub use disk::DiskFs;
pub use memory::MemoryFs;
pub use snapshot::TreeSnapshot;

/// The file operations the catalog tools need.
///
/// Mutating methods take `&mut self`; the engine assumes exclusive ownership
/// of the tree for the duration of a run.
pub trait CatalogFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Writes `contents`, replacing any existing file. The parent must exist.
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of `dir`, files and directories alike.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Moves `from` to `to`. The parent of `to` must exist.
    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()>;

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;

    fn remove_file(&mut self, path: &Path) -> io::Result<()>;

    /// Removes an empty directory; fails if it still has entries.
    fn remove_dir(&mut self, path: &Path) -> io::Result<()>;
}

/// Recursively collects `*.json` files under `root`, sorted by path.
///
/// Dot-prefixed files and directories are skipped, which keeps the staging
/// directory out of the record set. A missing root yields an empty list.
pub fn walk_json<F: CatalogFs + ?Sized>(fs: &F, root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_json_recursive(fs, root, &mut files);
    files.sort();
    files
}

fn collect_json_recursive<F: CatalogFs + ?Sized>(fs: &F, dir: &Path, out: &mut Vec<PathBuf>) {
    let children = match fs.read_dir(dir) {
        Ok(children) => children,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("cannot read directory {}: {e}", dir.display());
            }
            return;
        }
    };

    for path in children {
        let hidden = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }
        if fs.is_dir(&path) {
            collect_json_recursive(fs, &path, out);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
}

/// Returns `true` if `path` lies inside `root` (lexically, without touching disk).
pub fn is_within(root: &Path, path: &Path) -> bool {
    path.starts_with(root) && path != root
}

/// Resolves `.` and `..` components without touching the file system.
///
/// Paths are compared lexically throughout the engine, so every path that
/// enters from outside goes through here first.
pub fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
