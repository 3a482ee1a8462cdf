//! Consolidation of the record tree into a single database file.

use std::cmp::Ordering;
use std::path::Path;

use serde_json::Value;

use crate::diagnostic::Diagnostic;
use crate::error::{CoreError, CoreResult};
use crate::fs::{CatalogFs, TreeSnapshot};
use crate::record::to_pretty_json;

/// Collects every well-formed record in the snapshot, sorted by
/// `type`, then `number`, then `name`.
///
/// Files that cannot be loaded are returned as diagnostics instead.
pub fn consolidate(snapshot: &TreeSnapshot) -> (Vec<Value>, Vec<Diagnostic>) {
    let mut entries = Vec::with_capacity(snapshot.len());
    let mut diags = Vec::new();

    for path in snapshot.paths() {
        match snapshot.load_record(path) {
            Ok(record) => entries.push(record.into_value()),
            Err(diag) => diags.push(diag),
        }
    }

    entries.sort_by(compare_entries);
    (entries, diags)
}

fn compare_entries(a: &Value, b: &Value) -> Ordering {
    ["type", "number", "name"]
        .into_iter()
        .map(|key| sort_key(a, key).cmp(&sort_key(b, key)))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn sort_key(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Writes the consolidated database for the tree at `root` to `dist`.
///
/// Returns the number of entries written. The parent of `dist` is created
/// if needed.
///
/// # Errors
///
/// - [`CoreError::NotFound`] if `root` is not a directory; nothing is written.
/// - [`CoreError::Malformed`] if any record file cannot be loaded; nothing is written.
/// - [`CoreError::Io`] or [`CoreError::PermissionDenied`] if the write fails.
pub fn build_database<F: CatalogFs + ?Sized>(
    fs: &mut F,
    root: &Path,
    dist: &Path,
) -> CoreResult<usize> {
    if !fs.is_dir(root) {
        tracing::error!("source directory not found: {}", root.display());
        return Err(CoreError::NotFound(root.to_path_buf()));
    }
    let snapshot = TreeSnapshot::capture(&*fs, root);
    let (entries, diags) = consolidate(&snapshot);

    if !diags.is_empty() {
        for diag in &diags {
            tracing::error!("{diag}");
        }
        return Err(CoreError::Malformed(diags.len()));
    }

    if let Some(parent) = dist.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent)
            .map_err(|e| CoreError::from_io(parent, e))?;
    }
    fs.write(dist, &to_pretty_json(&entries))
        .map_err(|e| CoreError::from_io(dist, e))?;

    tracing::info!("built {} with {} entries", dist.display(), entries.len());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use serde_json::json;

    fn entry(ty: &str, number: &str, name: &str) -> String {
        json!({"name": name, "number": number, "type": ty}).to_string()
    }

    #[test]
    fn consolidate_sorts_by_type_number_name() {
        let snap = TreeSnapshot::from_contents(
            "/src",
            [
                ("/src/mu/a.json", entry("MU", "2", "B")),
                ("/src/mu/b.json", entry("MU", "1", "Z")),
                ("/src/metal-earth/c.json", entry("Metal Earth", "9", "A")),
                ("/src/mu/d.json", entry("MU", "1", "A")),
            ],
        );

        let (entries, diags) = consolidate(&snap);

        assert!(diags.is_empty());
        let order: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e["number"].as_str().unwrap(), e["name"].as_str().unwrap()))
            .collect();
        assert_eq!(order, vec![("1", "A"), ("1", "Z"), ("2", "B"), ("9", "A")]);
        assert_eq!(entries[3]["type"], "Metal Earth");
    }

    #[test]
    fn consolidate_keeps_field_order() {
        let snap = TreeSnapshot::from_contents(
            "/src",
            [("/src/mu/a.json", r#"{"zeta": 1, "name": "A", "alpha": 2}"#)],
        );

        let (entries, _) = consolidate(&snap);

        let keys: Vec<&String> = entries[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "name", "alpha"]);
    }

    #[test]
    fn consolidate_reports_malformed() {
        let snap = TreeSnapshot::from_contents(
            "/src",
            [
                ("/src/mu/a.json", entry("MU", "1", "A")),
                ("/src/mu/bad.json", "{".to_string()),
                ("/src/mu/list.json", "[]".to_string()),
            ],
        );

        let (entries, diags) = consolidate(&snap);

        assert_eq!(entries.len(), 1);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn build_writes_pretty_array() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/repo/src/mu/a.json", r#"{"name": "A"}"#);

        let count = build_database(
            &mut mem,
            Path::new("/repo/src"),
            Path::new("/repo/dist/Model-Database.json"),
        )
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(
            mem.file("/repo/dist/Model-Database.json"),
            Some("[\n    {\n        \"name\": \"A\"\n    }\n]")
        );
    }

    #[test]
    fn build_empty_tree_writes_empty_array() {
        let mut mem = MemoryFs::new();
        mem.create_dir_all(Path::new("/repo/src")).unwrap();

        let count =
            build_database(&mut mem, Path::new("/repo/src"), Path::new("/repo/dist/db.json"))
                .unwrap();

        assert_eq!(count, 0);
        assert_eq!(mem.file("/repo/dist/db.json"), Some("[]"));
    }

    #[test]
    fn build_refuses_malformed_tree() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/repo/src/mu/a.json", r#"{"name": "A"}"#);
        mem.insert_file("/repo/src/mu/b.json", "not json");

        let err = build_database(&mut mem, Path::new("/repo/src"), Path::new("/repo/dist/db.json"))
            .unwrap_err();

        assert!(matches!(err, CoreError::Malformed(1)));
        assert_eq!(mem.file("/repo/dist/db.json"), None);
    }

    #[test]
    fn build_refuses_missing_root() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/repo/other/mu/a.json", r#"{"name": "A"}"#);

        let err = build_database(&mut mem, Path::new("/repo/src"), Path::new("/repo/dist/db.json"))
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(p) if p == Path::new("/repo/src")));
        assert_eq!(mem.file("/repo/dist/db.json"), None);
        assert!(!mem.exists(Path::new("/repo/dist")));
    }

    #[test]
    fn build_refuses_file_as_root() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/repo/src", "{}");

        let err = build_database(&mut mem, Path::new("/repo/src"), Path::new("/repo/dist/db.json"))
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(mem.file("/repo/dist/db.json"), None);
    }
}
