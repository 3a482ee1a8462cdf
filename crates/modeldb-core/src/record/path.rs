//! Canonical location of a record inside the tree.
//!
//! `root/{slug(type)}/{slug(category)}-{slug(number)}-{slug(name)}.json`

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::Record;
use crate::slug::slug;

/// Where a record must live, derived only from its own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLocation {
    /// Folder under the tree root: `slug(type)`.
    pub directory: String,
    /// `slug(category)-slug(number)-slug(name).json`.
    pub filename: String,
    category: String,
    number: String,
    name: String,
}

impl CanonicalLocation {
    /// Path relative to the tree root.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.filename)
    }

    /// Absolute (root-joined) path.
    pub fn under(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }

    /// Name of the first identity field whose slug is empty, if any.
    ///
    /// A record with an empty segment would land in the tree root or get a
    /// filename like `--.json`; such records are rejected rather than moved.
    pub fn degenerate_field(&self) -> Option<&'static str> {
        [
            ("type", &self.directory),
            ("category", &self.category),
            ("number", &self.number),
            ("name", &self.name),
        ]
        .into_iter()
        .find(|(_, segment)| segment.is_empty())
        .map(|(field, _)| field)
    }
}

/// Computes the canonical directory and filename for `record`.
///
/// Pure: the result depends only on `type`, `category`, `number` and `name`,
/// never on where the file currently sits.
pub fn derive_path(record: &Record) -> CanonicalLocation {
    let directory = slug_field(record.get("type"));
    let category = slug_field(record.get("category"));
    let number = slug_field(record.get("number"));
    let name = slug_field(record.get("name"));
    let filename = format!("{category}-{number}-{name}.json");
    CanonicalLocation {
        directory,
        filename,
        category,
        number,
        name,
    }
}

/// Strings slug as-is, numbers through their decimal form, everything else is empty.
///
/// The older script tooling slugged every non-string to empty, so a record
/// with `"number": 7` used to sit at `<category>--<name>.json`. A fix run
/// moves such files to `<category>-7-<name>.json`.
fn slug_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => slug(s),
        Some(Value::Number(n)) => slug(&n.to_string()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn derives_wolf_example() {
        let loc = derive_path(&record(json!({
            "type": "Metal Earth",
            "category": "Animals",
            "number": "ME001",
            "name": "Wolf!",
            "link": ""
        })));
        assert_eq!(loc.directory, "metal-earth");
        assert_eq!(loc.filename, "animals-me001-wolf.json");
        assert_eq!(
            loc.relative_path(),
            Path::new("metal-earth").join("animals-me001-wolf.json")
        );
        assert_eq!(loc.degenerate_field(), None);
    }

    #[test]
    fn independent_of_extra_fields_and_order() {
        let a = derive_path(&record(json!({
            "name": "Big Ben", "number": "MMS019", "category": "Architecture", "type": "Metal Earth"
        })));
        let b = derive_path(&record(json!({
            "description": "clock tower", "type": "Metal Earth", "category": "Architecture",
            "number": "MMS019", "name": "Big Ben", "checked": true
        })));
        assert_eq!(a, b);
    }

    #[test]
    fn numeric_number_is_rendered() {
        let loc = derive_path(&record(json!({
            "type": "Tenyo", "category": "Cars", "number": 1001, "name": "Mini"
        })));
        assert_eq!(loc.filename, "cars-1001-mini.json");
    }

    #[test]
    fn missing_type_is_degenerate() {
        let loc = derive_path(&record(json!({
            "category": "Cars", "number": "A1", "name": "Mini"
        })));
        assert_eq!(loc.directory, "");
        assert_eq!(loc.degenerate_field(), Some("type"));
    }

    #[test]
    fn all_punctuation_name_is_degenerate() {
        let loc = derive_path(&record(json!({
            "type": "MU", "category": "Ships", "number": "YM-N001", "name": "???"
        })));
        assert_eq!(loc.filename, "ships-ym-n001-.json");
        assert_eq!(loc.degenerate_field(), Some("name"));
    }

    #[test]
    fn under_joins_root() {
        let loc = derive_path(&record(json!({
            "type": "MU", "category": "Ships", "number": "1", "name": "Ark"
        })));
        assert_eq!(
            loc.under(Path::new("/repo/src")),
            Path::new("/repo/src/mu/ships-1-ark.json")
        );
    }
}
