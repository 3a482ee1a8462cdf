//! Lint and normalization settings.
//!
//! Read from `lint-settings.json` (or a `.toml` file with the same keys).
//! Every key falls back to the built-in constants on its own, so a settings
//! file only needs to mention what it changes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{CoreError, CoreResult};

/// Link used when a record's type has no usable default link.
pub const FALLBACK_LINK: &str = "https://www.metalearth.com";

const BUILTIN_TYPES: &[&str] = &[
    "Metal Earth",
    "ICONX",
    "Legends",
    "Mega",
    "Premium Series",
    "MU",
    "Piececool",
    "Tenyo",
    "Microworld",
    "Ironstar",
    "Picture Kingdom",
    "HK Nanyuan",
    "Metal Tour",
    "DaTang",
    "Strato Studio",
];

const BUILTIN_STATUS: &[&str] = &["", "Coming Soon", "Exclusive", "Retired"];

const BUILTIN_LINKS: &[(&str, &str)] = &[
    ("Metal Earth", "https://www.metalearth.com"),
    ("ICONX", "https://www.metalearth.com"),
    ("Legends", "https://www.metalearth.com"),
    ("Mega", "https://www.metalearth.com"),
    ("Premium Series", "https://www.metalearth.com"),
    ("MU", "https://www.mu-store.com"),
    ("Piececool", "https://piececool.com"),
    ("Tenyo", "https://tenyo.jp"),
    ("Microworld", ""),
    ("Ironstar", ""),
    ("Picture Kingdom", ""),
    ("HK Nanyuan", ""),
    ("Metal Tour", ""),
    ("DaTang", ""),
    ("Strato Studio", ""),
];

fn builtin_defaults() -> Map<String, Value> {
    let value = json!({
        "checked": false,
        "difficulty": null,
        "sheets": null,
        "status": "",
        "instructionsLink": "",
        "360View": "",
        "description": "",
        "productimage": ""
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Settings shared by the validator and the schema normalizer.
///
/// Loaded once per invocation; treat as read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Closed set of product lines accepted in `type`.
    pub allowed_types: Vec<String>,
    /// Closed set of values accepted in `status` (includes `""`).
    pub allowed_status: Vec<String>,
    /// Default value per field, used when a field is absent or null.
    pub defaults: Map<String, Value>,
    /// Default `link` per record type.
    pub default_links: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_types: BUILTIN_TYPES.iter().map(|s| s.to_string()).collect(),
            allowed_status: BUILTIN_STATUS.iter().map(|s| s.to_string()).collect(),
            defaults: builtin_defaults(),
            default_links: BUILTIN_LINKS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// On-disk shape. Fields are kept loose so one bad key doesn't discard the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    #[serde(default)]
    allowed_types: Option<Value>,
    #[serde(default)]
    allowed_status: Option<Value>,
    #[serde(default)]
    defaults: Option<Value>,
    #[serde(default)]
    default_links: Option<Value>,
}

impl Settings {
    /// Loads settings from `path`. Files ending in `.toml` are parsed as TOML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the content is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_io(path, e))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Like [`Settings::load`], but any failure yields the built-in settings.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(CoreError::NotFound(_)) => {
                tracing::warn!("no settings at {}, using built-ins", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("ignoring settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        let raw: RawSettings =
            serde_json::from_str(content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        let value =
            serde_json::to_value(table).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        let raw: RawSettings =
            serde_json::from_value(value).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawSettings) -> Self {
        let mut settings = Self::default();

        if let Some(types) = raw.allowed_types.as_ref().and_then(string_list) {
            settings.allowed_types = types;
        }
        if let Some(status) = raw.allowed_status.as_ref().and_then(string_list) {
            settings.allowed_status = status;
        }
        if let Some(Value::Object(defaults)) = raw.defaults {
            for (key, value) in defaults {
                settings.defaults.insert(key, value);
            }
        }
        if let Some(Value::Object(links)) = raw.default_links {
            for (ty, link) in links {
                match link {
                    Value::String(url) => {
                        settings.default_links.insert(ty, url);
                    }
                    other => tracing::warn!("defaultLinks[{ty}] is not a string: {other}"),
                }
            }
        }

        settings
    }

    /// Default value for `field`, if one is configured.
    pub fn default_for(&self, field: &str) -> Option<&Value> {
        self.defaults.get(field)
    }

    /// Link to use for a record of type `record_type` whose own link is unusable.
    ///
    /// Unknown types and types configured with an empty link get [`FALLBACK_LINK`].
    pub fn link_for_type(&self, record_type: Option<&str>) -> &str {
        record_type
            .and_then(|ty| self.default_links.get(ty))
            .map(String::as_str)
            .filter(|link| !link.is_empty())
            .unwrap_or(FALLBACK_LINK)
    }

    pub fn is_allowed_type(&self, ty: &str) -> bool {
        self.allowed_types.iter().any(|t| t == ty)
    }

    pub fn is_allowed_status(&self, status: &str) -> bool {
        self.allowed_status.iter().any(|s| s == status)
    }
}

/// `Some` only for an array made entirely of strings.
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
