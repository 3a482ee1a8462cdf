//! In-memory [`CatalogFs`] for deterministic tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use super::CatalogFs;

/// A file tree held in memory.
///
/// Directories are tracked explicitly so that "parent must exist" behaves
/// like the disk. Renames can be made to fail on purpose to exercise
/// recovery paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    failing_sources: Vec<PathBuf>,
    failing_targets: Vec<PathBuf>,
}

impl MemoryFs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating its parent directories.
    pub fn insert_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.add_dirs(parent);
        }
        self.files.insert(path, contents.into());
    }

    /// Makes every rename whose source lies under `path` fail.
    #[must_use]
    pub fn with_failing_rename_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_sources.push(path.into());
        self
    }

    /// Makes every rename whose target lies under `path` fail.
    #[must_use]
    pub fn with_failing_rename_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_targets.push(path.into());
        self
    }

    /// Content of the file at `path`, if any.
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// All file paths, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    fn add_dirs(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.dirs.contains(parent),
            _ => true,
        }
    }

    fn children(&self, dir: &Path) -> Vec<PathBuf> {
        self.files
            .keys()
            .chain(self.dirs.iter())
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

impl CatalogFs for MemoryFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        if self.dirs.contains(path) {
            return Err(io::Error::other(format!("{} is a directory", path.display())));
        }
        if !self.parent_exists(path) {
            return Err(not_found(path));
        }
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.dirs.contains(dir) {
            return Err(not_found(dir));
        }
        Ok(self.children(dir))
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        let injected = self.failing_sources.iter().any(|p| from.starts_with(p))
            || self.failing_targets.iter().any(|p| to.starts_with(p));
        if injected {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected failure renaming {} -> {}", from.display(), to.display()),
            ));
        }
        if !self.parent_exists(to) {
            return Err(not_found(to));
        }
        let contents = self.files.remove(from).ok_or_else(|| not_found(from))?;
        self.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        if self.files.contains_key(path) {
            return Err(io::Error::other(format!("{} is a file", path.display())));
        }
        self.add_dirs(path);
        Ok(())
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        self.files.remove(path).map(|_| ()).ok_or_else(|| not_found(path))
    }

    fn remove_dir(&mut self, path: &Path) -> io::Result<()> {
        if !self.dirs.contains(path) {
            return Err(not_found(path));
        }
        if !self.children(path).is_empty() {
            return Err(io::Error::other(format!(
                "{} is not empty",
                path.display()
            )));
        }
        self.dirs.remove(path);
        Ok(())
    }
}
