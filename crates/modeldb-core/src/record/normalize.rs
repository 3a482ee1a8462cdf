//! Schema normalization: fill defaults, fix key order.

use serde_json::Value;

use super::{Record, CANONICAL_KEYS};
use crate::config::settings::Settings;

/// Returns a copy of `record` with every canonical field in canonical order.
///
/// - An absent or null field takes `settings.defaults[field]`; if no default
///   is configured the field stays absent.
/// - `link` that is absent, null or blank resolves through
///   [`Settings::link_for_type`] using the record's `type`.
/// - Any other present value passes through untouched, even if it would fail
///   validation.
/// - Non-canonical fields follow in their original order.
///
/// Normalizing an already normalized record returns it unchanged.
pub fn normalize(record: &Record, settings: &Settings) -> Record {
    let mut out = Record::default();

    for key in CANONICAL_KEYS {
        let resolved = match record.get(key) {
            None | Some(Value::Null) if key == "link" => Some(default_link(record, settings)),
            None | Some(Value::Null) => settings.default_for(key).cloned(),
            Some(Value::String(s)) if key == "link" && s.trim().is_empty() => {
                Some(default_link(record, settings))
            }
            Some(value) => Some(value.clone()),
        };
        if let Some(value) = resolved {
            out.insert(key, value);
        }
    }

    for (key, value) in record.iter() {
        if !CANONICAL_KEYS.contains(&key.as_str()) {
            out.insert(key.clone(), value.clone());
        }
    }

    out
}

fn default_link(record: &Record, settings: &Settings) -> Value {
    Value::String(settings.link_for_type(record.get_str("type")).to_string())
}
