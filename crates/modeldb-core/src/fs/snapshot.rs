//! Point-in-time capture of the record tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{walk_json, CatalogFs};
use crate::diagnostic::Diagnostic;
use crate::error::CoreError;
use crate::record::Record;

/// Every JSON file under a root, with its text or the reason it couldn't be read.
///
/// Captured once per phase. Consumers never go back to the file system, which
/// makes planning deterministic and testable without disk I/O.
#[derive(Debug, Clone, Default)]
pub struct TreeSnapshot {
    root: PathBuf,
    files: BTreeMap<PathBuf, Result<String, String>>,
}

impl TreeSnapshot {
    /// Walks `root` and reads every JSON file found.
    pub fn capture<F: CatalogFs + ?Sized>(fs: &F, root: &Path) -> Self {
        let files = walk_json(fs, root)
            .into_iter()
            .map(|path| {
                let content = fs.read_to_string(&path).map_err(|e| e.to_string());
                (path, content)
            })
            .collect();
        Self {
            root: root.to_path_buf(),
            files,
        }
    }

    /// Reads only `paths`, which are expected to lie under `root`.
    pub fn capture_paths<F: CatalogFs + ?Sized>(fs: &F, root: &Path, paths: &[PathBuf]) -> Self {
        let files = paths
            .iter()
            .filter(|path| fs.exists(path))
            .map(|path| {
                let content = fs.read_to_string(path).map_err(|e| e.to_string());
                (path.clone(), content)
            })
            .collect();
        Self {
            root: root.to_path_buf(),
            files,
        }
    }

    /// Builds a snapshot from literal contents.
    pub fn from_contents<I, P, S>(root: impl Into<PathBuf>, files: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            root: root.into(),
            files: files
                .into_iter()
                .map(|(p, s)| (p.into(), Ok(s.into())))
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All captured paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether a file was present at `path` when the snapshot was taken.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Parses the record at `path`.
    ///
    /// Missing, unreadable, non-JSON and non-object files all come back as a
    /// diagnostic naming the file.
    pub fn load_record(&self, path: &Path) -> Result<Record, Diagnostic> {
        match self.files.get(path) {
            None => Err(Diagnostic::for_path(path, "file not found")),
            Some(Err(e)) => Err(Diagnostic::for_path(path, format!("error reading: {e}"))),
            Some(Ok(text)) => Record::from_json_str(text).map_err(|e| match e {
                CoreError::NotAnObject => Diagnostic::for_path(path, "skipping non-object file"),
                other => Diagnostic::for_path(path, other.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;

    #[test]
    fn capture_reads_all_json() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/src/mu/a.json", r#"{"name": "A"}"#);
        mem.insert_file("/src/tenyo/b.json", "[]");

        let snap = TreeSnapshot::capture(&mem, Path::new("/src"));

        assert_eq!(snap.len(), 2);
        assert!(snap.contains(Path::new("/src/mu/a.json")));
        assert_eq!(snap.root(), Path::new("/src"));
    }

    #[test]
    fn capture_paths_reads_selection() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/src/mu/a.json", "{}");
        mem.insert_file("/src/mu/b.json", "{}");

        let snap = TreeSnapshot::capture_paths(
            &mem,
            Path::new("/src"),
            &[PathBuf::from("/src/mu/b.json"), PathBuf::from("/src/mu/gone.json")],
        );

        assert_eq!(snap.len(), 1);
        assert!(snap.contains(Path::new("/src/mu/b.json")));
    }

    #[test]
    fn load_record_ok() {
        let snap = TreeSnapshot::from_contents("/s", [("/s/a.json", r#"{"name": "A"}"#)]);
        let record = snap.load_record(Path::new("/s/a.json")).unwrap();
        assert_eq!(record.get_str("name"), Some("A"));
    }

    #[test]
    fn load_record_diagnostics() {
        let snap = TreeSnapshot::from_contents(
            "/s",
            [("/s/bad.json", "{oops"), ("/s/list.json", "[1]")],
        );

        let bad = snap.load_record(Path::new("/s/bad.json")).unwrap_err();
        assert!(bad.message.starts_with("invalid JSON"));

        let list = snap.load_record(Path::new("/s/list.json")).unwrap_err();
        assert_eq!(list.message, "skipping non-object file");

        let missing = snap.load_record(Path::new("/s/none.json")).unwrap_err();
        assert_eq!(missing.message, "file not found");
    }
}
