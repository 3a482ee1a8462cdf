//! Field and layout validation.
//!
//! Every check runs over the whole batch; nothing stops at the first failure.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;

use crate::config::settings::Settings;
use crate::diagnostic::Diagnostic;
use crate::error::{CoreError, CoreResult};
use crate::fs::{CatalogFs, TreeSnapshot};
use crate::record::derive_path;
use crate::slug::slug;

const REQUIRED_FIELDS: [&str; 5] = ["number", "name", "category", "link", "type"];

/// Checks one entry's field values. Returns human-readable problems.
pub fn lint_entry(entry: &Value, settings: &Settings) -> Vec<String> {
    let Some(fields) = entry.as_object() else {
        return vec!["Entry must be an object.".to_string()];
    };
    let mut errors = Vec::new();

    for key in REQUIRED_FIELDS {
        let missing = match fields.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            errors.push(format!("Missing or empty required field: \"{key}\"."));
        }
    }

    if let Some(checked) = fields.get("checked") {
        if !checked.is_boolean() {
            errors.push("\"checked\" must be a boolean.".to_string());
        }
    }

    match fields.get("type") {
        None | Some(Value::Null) => {}
        Some(ty) if ty.as_str().is_some_and(|t| settings.is_allowed_type(t)) => {}
        Some(ty) => errors.push(format!(
            "\"type\" must be one of: {}. Got: {ty}",
            settings.allowed_types.join(", ")
        )),
    }

    match fields.get("status") {
        None | Some(Value::Null) => {}
        Some(status) if status.as_str().is_some_and(|s| settings.is_allowed_status(s)) => {}
        Some(status) => {
            let allowed: Vec<&str> = settings
                .allowed_status
                .iter()
                .map(|s| if s.is_empty() { "\"\"" } else { s.as_str() })
                .collect();
            errors.push(format!(
                "\"status\" must be one of: {}. Got: {status}",
                allowed.join(", ")
            ));
        }
    }

    match fields.get("difficulty") {
        None | Some(Value::Null) => {}
        Some(difficulty) => {
            let valid = as_number(difficulty)
                .is_some_and(|n| n.fract() == 0.0 && (1.0..=10.0).contains(&n));
            if !valid {
                errors.push(format!(
                    "\"difficulty\" must be an integer 1-10 or null. Got: {difficulty}"
                ));
            }
        }
    }

    match fields.get("sheets") {
        None | Some(Value::Null) => {}
        Some(sheets) => {
            if !as_number(sheets).is_some_and(|n| n >= 0.0) {
                errors.push(format!(
                    "\"sheets\" must be a non-negative number. Got: {sheets}"
                ));
            }
        }
    }

    errors
}

/// Numbers as-is; numeric strings parsed. Anything else is not a number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Lints one record file: location, folder, filename and field values.
pub fn lint_file(snapshot: &TreeSnapshot, path: &Path, settings: &Settings) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let root = snapshot.root();

    let parts: Vec<String> = match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    if parts.len() != 2 {
        diags.push(Diagnostic::for_path(
            path,
            format!(
                "File must be directly under {}/{{type}}/ (e.g. {}/metal-earth/...).",
                root.display(),
                root.display()
            ),
        ));
        return diags;
    }
    let folder = parts[0].as_str();
    let basename = parts[1].as_str();

    let allowed_folders: BTreeSet<String> =
        settings.allowed_types.iter().map(|t| slug(t)).collect();
    if !allowed_folders.contains(folder) {
        let list: Vec<&str> = allowed_folders.iter().map(String::as_str).collect();
        diags.push(Diagnostic::for_path(
            path,
            format!("Folder must be one of: {}. Got: \"{folder}\".", list.join(", ")),
        ));
    }

    let record = match snapshot.load_record(path) {
        Ok(record) => record,
        Err(diag) => {
            diags.push(diag);
            return diags;
        }
    };

    for message in lint_entry(&record.clone().into_value(), settings) {
        diags.push(Diagnostic::for_path(path, message));
    }

    let location = derive_path(&record);
    if !location.directory.is_empty() && folder != location.directory {
        diags.push(Diagnostic::for_path(
            path,
            format!(
                "Folder must match type. Type is {} so folder must be \"{}\".",
                record.get("type").map(Value::to_string).unwrap_or_default(),
                location.directory
            ),
        ));
    }

    if basename != location.filename {
        diags.push(Diagnostic::for_path(
            path,
            format!(
                "Filename must be {{category}}-{{number}}-{{name}}.json (lowercase, spaces as dashes). Expected: {}. Got: {basename}.",
                location.filename
            ),
        ));
    }

    diags
}

/// Lints `files`, or every file in the snapshot when `files` is `None`.
pub fn lint_tree(
    snapshot: &TreeSnapshot,
    files: Option<&[PathBuf]>,
    settings: &Settings,
) -> Vec<Diagnostic> {
    let all: Vec<PathBuf>;
    let targets: &[PathBuf] = match files {
        Some(files) => files,
        None => {
            all = snapshot.paths().map(Path::to_path_buf).collect();
            &all
        }
    };

    let diags: Vec<Diagnostic> = targets
        .iter()
        .flat_map(|path| lint_file(snapshot, path, settings))
        .collect();
    tracing::debug!("linted {} file(s), {} problem(s)", targets.len(), diags.len());
    diags
}

/// Lints a consolidated database file (a JSON array of entries).
///
/// # Errors
///
/// - [`CoreError::NotFound`] if the file does not exist.
/// - [`CoreError::InvalidJson`] if it is not JSON.
/// - [`CoreError::NotAnArray`] if the top level is not an array.
pub fn lint_database<F: CatalogFs + ?Sized>(
    fs: &F,
    path: &Path,
    settings: &Settings,
) -> CoreResult<Vec<Diagnostic>> {
    let entries = read_database(fs, path)?;
    Ok(entries
        .iter()
        .enumerate()
        .flat_map(|(index, entry)| {
            lint_entry(entry, settings)
                .into_iter()
                .map(move |message| Diagnostic::new(format!("[{index}]"), message))
        })
        .collect())
}

/// Reads a consolidated database array.
pub(crate) fn read_database<F: CatalogFs + ?Sized>(fs: &F, path: &Path) -> CoreResult<Vec<Value>> {
    let text = fs
        .read_to_string(path)
        .map_err(|e| CoreError::from_io(path, e))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| CoreError::InvalidJson(e.to_string()))?;
    match value {
        Value::Array(entries) => Ok(entries),
        _ => Err(CoreError::NotAnArray(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "checked": false,
            "name": "Wolf",
            "number": "ME001",
            "difficulty": 3,
            "sheets": 1.5,
            "link": "https://www.metalearth.com",
            "category": "Animals",
            "type": "Metal Earth",
            "status": ""
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut entry = valid();
        entry[field] = value;
        entry
    }

    #[test]
    fn valid_entry_has_no_errors() {
        assert!(lint_entry(&valid(), &Settings::default()).is_empty());
    }

    #[test]
    fn non_object_entry() {
        let errors = lint_entry(&json!([1]), &Settings::default());
        assert_eq!(errors, vec!["Entry must be an object."]);
    }

    #[test]
    fn required_fields_missing_or_blank() {
        let settings = Settings::default();
        let errors = lint_entry(&json!({"name": "  ", "number": null}), &settings);

        for key in REQUIRED_FIELDS {
            assert!(
                errors.iter().any(|e| e.contains(&format!("\"{key}\""))),
                "no error for {key}: {errors:?}"
            );
        }
    }

    #[test]
    fn checked_must_be_boolean() {
        let errors = lint_entry(&with("checked", json!("no")), &Settings::default());
        assert_eq!(errors, vec!["\"checked\" must be a boolean."]);
    }

    #[test]
    fn type_must_be_allowed() {
        let errors = lint_entry(&with("type", json!("Lego")), &Settings::default());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("\"type\" must be one of: Metal Earth, ICONX"));
        assert!(errors[0].ends_with("Got: \"Lego\""));
    }

    #[test]
    fn status_must_be_allowed() {
        let settings = Settings::default();
        assert!(lint_entry(&with("status", json!("Retired")), &settings).is_empty());
        assert!(lint_entry(&with("status", Value::Null), &settings).is_empty());

        let errors = lint_entry(&with("status", json!("Gone")), &settings);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("\"\", Coming Soon, Exclusive, Retired"));
    }

    #[test]
    fn difficulty_range() {
        let settings = Settings::default();
        for ok in [json!(1), json!(10), json!("7"), Value::Null] {
            assert!(lint_entry(&with("difficulty", ok.clone()), &settings).is_empty(), "{ok}");
        }
        for bad in [json!(0), json!(11), json!(2.5), json!("hard"), json!(true)] {
            assert_eq!(lint_entry(&with("difficulty", bad.clone()), &settings).len(), 1, "{bad}");
        }
    }

    #[test]
    fn sheets_non_negative() {
        let settings = Settings::default();
        assert!(lint_entry(&with("sheets", json!(0)), &settings).is_empty());
        assert_eq!(lint_entry(&with("sheets", json!(-1)), &settings).len(), 1);
        assert_eq!(lint_entry(&with("sheets", json!("many")), &settings).len(), 1);
    }

    #[test]
    fn collects_every_problem() {
        let entry = json!({"checked": 1, "type": "Lego", "difficulty": 99, "sheets": -2});
        let errors = lint_entry(&entry, &Settings::default());
        // four missing required fields + checked + type + difficulty + sheets
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn lint_file_canonical_is_clean() {
        let snap = TreeSnapshot::from_contents(
            "/src",
            [("/src/metal-earth/animals-me001-wolf.json", valid().to_string())],
        );

        let diags = lint_file(
            &snap,
            Path::new("/src/metal-earth/animals-me001-wolf.json"),
            &Settings::default(),
        );

        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn lint_file_wrong_folder_and_name() {
        let snap = TreeSnapshot::from_contents(
            "/src",
            [("/src/mu/wolf.json", valid().to_string())],
        );

        let diags = lint_file(&snap, Path::new("/src/mu/wolf.json"), &Settings::default());
        let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();

        assert_eq!(diags.len(), 2, "{messages:?}");
        assert!(messages[0].contains("folder must be \"metal-earth\""));
        assert!(messages[1].contains("Expected: animals-me001-wolf.json. Got: wolf.json."));
    }

    #[test]
    fn lint_file_unknown_folder() {
        let snap = TreeSnapshot::from_contents("/src", [("/src/lego/x.json", "{}")]);

        let diags = lint_file(&snap, Path::new("/src/lego/x.json"), &Settings::default());

        assert!(diags[0].message.starts_with("Folder must be one of:"));
        assert!(diags[0].message.contains("metal-earth"));
    }

    #[test]
    fn lint_file_at_root_level() {
        let snap = TreeSnapshot::from_contents("/src", [("/src/x.json", "{}")]);
        let diags = lint_file(&snap, Path::new("/src/x.json"), &Settings::default());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.starts_with("File must be directly under"));
    }

    #[test]
    fn lint_file_invalid_json() {
        let snap = TreeSnapshot::from_contents("/src", [("/src/mu/x.json", "{")]);
        let diags = lint_file(&snap, Path::new("/src/mu/x.json"), &Settings::default());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.starts_with("invalid JSON"));
    }

    #[test]
    fn lint_tree_covers_all_files() {
        let snap = TreeSnapshot::from_contents(
            "/src",
            [
                ("/src/metal-earth/animals-me001-wolf.json", valid().to_string()),
                ("/src/mu/a.json", "[]".to_string()),
                ("/src/mu/b.json", "{".to_string()),
            ],
        );

        let diags = lint_tree(&snap, None, &Settings::default());

        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn lint_database_labels_by_index() {
        let mut mem = MemoryFs::new();
        let db = json!([valid(), with("type", json!("Lego")), 5]);
        mem.insert_file("/dist/db.json", db.to_string());

        let diags = lint_database(&mem, Path::new("/dist/db.json"), &Settings::default()).unwrap();

        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].subject, "[1]");
        assert_eq!(diags[1].subject, "[2]");
    }

    #[test]
    fn lint_database_requires_array() {
        let mut mem = MemoryFs::new();
        mem.insert_file("/dist/db.json", "{}");

        let err = lint_database(&mem, Path::new("/dist/db.json"), &Settings::default()).unwrap_err();

        assert!(matches!(err, CoreError::NotAnArray(_)));
    }

    #[test]
    fn lint_database_missing_file() {
        let mem = MemoryFs::new();
        let err = lint_database(&mem, Path::new("/dist/db.json"), &Settings::default()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
