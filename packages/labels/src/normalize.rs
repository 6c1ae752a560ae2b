// ABOUTME: Tagged-variant label parsing
// ABOUTME: One boundary-level parse replaces shape-branching deeper in the pipeline

use casebook_core::constants::LABEL_CATEGORIES;
use casebook_core::types::LabelSet;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One label value as it may appear on the wire. The object form carried a
/// `client` association historically; only `name` survives normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Text(String),
    Entry {
        name: String,
        #[serde(default)]
        #[allow(dead_code)]
        client: Option<String>,
    },
}

impl RawLabel {
    fn into_display(self) -> String {
        match self {
            RawLabel::Text(s) => s,
            RawLabel::Entry { name, .. } => name,
        }
    }
}

/// Normalize any accepted label payload into the canonical LabelSet.
///
/// Accepts the category-keyed object, a bare array (historically the
/// `client` axis), or a JSON-string encoding of either. Anything
/// unrecognizable yields the empty canonical set rather than an error:
/// labels are best-effort enrichment, not core correctness data.
pub fn normalize(value: &Value) -> LabelSet {
    match value {
        Value::Object(_) => normalize_set(value),
        Value::Array(_) => {
            let mut set = empty_canonical_set();
            set.set_values("client", normalize_values(value));
            set
        }
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) if !decoded.is_string() => normalize(&decoded),
            _ => {
                debug!("Dropping unparseable label payload");
                empty_canonical_set()
            }
        },
        _ => empty_canonical_set(),
    }
}

/// Normalize the payload of a single category into an ordered value list.
///
/// Order is preserved and duplicates are kept — label identity is
/// positional. Malformed entries (null, objects without `name`) drop
/// silently.
pub fn normalize_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<RawLabel>(item.clone()) {
                Ok(label) => {
                    let display = label.into_display();
                    if display.trim().is_empty() {
                        None
                    } else {
                        Some(display)
                    }
                }
                Err(_) => {
                    debug!("Dropping malformed label entry: {}", item);
                    None
                }
            })
            .collect(),
        Value::String(s) => {
            // May be a JSON-encoded array, or a single plain label
            match serde_json::from_str::<Value>(s) {
                Ok(decoded) if decoded.is_array() => normalize_values(&decoded),
                _ if s.trim().is_empty() => Vec::new(),
                _ => vec![s.clone()],
            }
        }
        _ => Vec::new(),
    }
}

/// Normalize a category-keyed object (or its JSON-string encoding).
///
/// Every known category key is present in the result even when empty;
/// unknown categories pass through after the known ones, preserving their
/// input order.
pub fn normalize_set(value: &Value) -> LabelSet {
    let object = match value {
        Value::Object(map) => map.clone(),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => map,
            _ => return empty_canonical_set(),
        },
        _ => return empty_canonical_set(),
    };

    let mut set = empty_canonical_set();
    for (category, payload) in &object {
        set.set_values(category, normalize_values(payload));
    }
    set
}

fn empty_canonical_set() -> LabelSet {
    let mut set = LabelSet::new();
    for category in LABEL_CATEGORIES {
        set.ensure_category(category);
    }
    set
}
