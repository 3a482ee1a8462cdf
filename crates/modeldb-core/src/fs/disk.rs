//! [`CatalogFs`] backed by `std::fs`.

use std::io;
use std::path::{Path, PathBuf};

use super::CatalogFs;

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl CatalogFs for DiskFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling symlink still counts as occupied
        std::fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok_and(|m| m.is_dir())
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            children.push(entry.path());
        }
        Ok(children)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir(&mut self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.json");
        let mut disk = DiskFs;

        disk.write(&path, "{}").unwrap();

        assert_eq!(disk.read_to_string(&path).unwrap(), "{}");
        assert!(disk.exists(&path));
        assert!(!disk.is_dir(&path));
    }

    #[test]
    fn rename_moves_content() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("from.json");
        let to = tmp.path().join("to.json");
        fs::write(&from, "x").unwrap();

        DiskFs.rename(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "x");
    }

    #[test]
    fn remove_dir_refuses_non_empty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("f.json"), "").unwrap();

        assert!(DiskFs.remove_dir(&dir).is_err());
        fs::remove_file(dir.join("f.json")).unwrap();
        DiskFs.remove_dir(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn read_dir_lists_children() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.json"), "").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();

        let mut children = DiskFs.read_dir(tmp.path()).unwrap();
        children.sort();

        assert_eq!(children, vec![tmp.path().join("a.json"), tmp.path().join("sub")]);
    }
}
