// ABOUTME: "Coerce and locate" for the polymorphic form fields
// ABOUTME: One priority order, one decode path; malformed input degrades to empty

use casebook_core::types::{CaseStudyForm, CustomMetric, DiagramSection, Workstream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Locate a polymorphic field: the root-level form field wins over the
/// legacy nested-under-questionnaire field, at every call site. Inside the
/// nested object the field may sit under `content` or at the top.
fn locate<'a>(root: Option<&'a Value>, form: &'a CaseStudyForm, key: &str) -> Option<&'a Value> {
    if let Some(value) = root {
        return Some(value);
    }
    let nested = form.questionnaire.as_ref()?;
    nested
        .get("content")
        .and_then(|content| content.get(key))
        .or_else(|| nested.get(key))
}

/// Decode a located value into a typed list. Accepts an array or a
/// JSON-encoded string of one; anything else (including parse failures)
/// degrades to empty with a warning — these fields are best-effort
/// enrichments, not core correctness data, and must never fail a request.
fn coerce_array<T: DeserializeOwned>(value: Option<&Value>, field: &str) -> Vec<T> {
    let Some(value) = value else {
        return Vec::new();
    };

    let decoded;
    let value = match value {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(parsed) => {
                decoded = parsed;
                &decoded
            }
            Err(e) => {
                warn!("Dropping unparseable {} payload: {}", field, e);
                return Vec::new();
            }
        },
        other => other,
    };

    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Dropping malformed {} entry: {}", field, e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        _ => {
            warn!("Ignoring non-array {} payload", field);
            Vec::new()
        }
    }
}

/// Whether any source, root-level or nested, carries a customMetrics value.
/// Merge-style updates use this to distinguish "field absent, keep existing"
/// from "field present, replace" without re-implementing the priority order.
pub fn has_custom_metrics(form: &CaseStudyForm) -> bool {
    locate(form.custom_metrics.as_ref(), form, "customMetrics").is_some()
}

pub fn has_workstreams(form: &CaseStudyForm) -> bool {
    locate(
        form.implementation_workstreams.as_ref(),
        form,
        "implementationWorkstreams",
    )
    .is_some()
}

pub fn has_diagram_sections(form: &CaseStudyForm) -> bool {
    locate(
        form.architecture_diagrams.as_ref(),
        form,
        "architectureDiagrams",
    )
    .is_some()
}

pub fn coerce_custom_metrics(form: &CaseStudyForm) -> Vec<CustomMetric> {
    coerce_array(
        locate(form.custom_metrics.as_ref(), form, "customMetrics"),
        "customMetrics",
    )
}

pub fn coerce_workstreams(form: &CaseStudyForm) -> Vec<Workstream> {
    coerce_array(
        locate(
            form.implementation_workstreams.as_ref(),
            form,
            "implementationWorkstreams",
        ),
        "implementationWorkstreams",
    )
}

pub fn coerce_diagram_sections(form: &CaseStudyForm) -> Vec<DiagramSection> {
    coerce_array(
        locate(
            form.architecture_diagrams.as_ref(),
            form,
            "architectureDiagrams",
        ),
        "architectureDiagrams",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_already_parsed_array() {
        let form = CaseStudyForm {
            custom_metrics: Some(json!([{"name": "Deployments", "value": 42}])),
            ..Default::default()
        };
        let metrics = coerce_custom_metrics(&form);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].value, "42");
    }

    #[test]
    fn test_json_string_encoded_array() {
        let form = CaseStudyForm {
            implementation_workstreams: Some(json!(
                "[{\"name\":\"Data platform\",\"description\":\"ETL\"}]"
            )),
            ..Default::default()
        };
        let workstreams = coerce_workstreams(&form);
        assert_eq!(workstreams.len(), 1);
        assert_eq!(workstreams[0].name, "Data platform");
    }

    #[test]
    fn test_root_field_wins_over_nested() {
        let form = CaseStudyForm {
            implementation_workstreams: Some(json!([{"name": "root wins"}])),
            questionnaire: Some(json!({
                "content": {
                    "implementationWorkstreams": [{"name": "nested loses"}]
                }
            })),
            ..Default::default()
        };
        let workstreams = coerce_workstreams(&form);
        assert_eq!(workstreams.len(), 1);
        assert_eq!(workstreams[0].name, "root wins");
    }

    #[test]
    fn test_nested_field_used_when_root_absent() {
        let form = CaseStudyForm {
            questionnaire: Some(json!({
                "content": {
                    "architectureDiagrams": [{"name": "Target", "diagrams": []}]
                }
            })),
            ..Default::default()
        };
        let sections = coerce_diagram_sections(&form);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "Target");
    }

    #[test]
    fn test_nested_field_found_without_content_wrapper() {
        let form = CaseStudyForm {
            questionnaire: Some(json!({
                "customMetrics": [{"name": "NPS", "value": "+20"}]
            })),
            ..Default::default()
        };
        assert_eq!(coerce_custom_metrics(&form).len(), 1);
    }

    #[test]
    fn test_presence_checks_follow_the_same_priority() {
        let empty = CaseStudyForm::default();
        assert!(!has_custom_metrics(&empty));
        assert!(!has_workstreams(&empty));
        assert!(!has_diagram_sections(&empty));

        let root_only = CaseStudyForm {
            implementation_workstreams: Some(json!([])),
            ..Default::default()
        };
        assert!(has_workstreams(&root_only));

        // A nested-only payload counts as present too
        let nested_only = CaseStudyForm {
            questionnaire: Some(json!({
                "content": {
                    "customMetrics": [{"name": "NPS", "value": "+20"}],
                    "architectureDiagrams": []
                }
            })),
            ..Default::default()
        };
        assert!(has_custom_metrics(&nested_only));
        assert!(has_diagram_sections(&nested_only));
        assert!(!has_workstreams(&nested_only));
    }

    #[test]
    fn test_malformed_payload_degrades_to_empty() {
        let form = CaseStudyForm {
            custom_metrics: Some(json!("{{{not json")),
            ..Default::default()
        };
        assert!(coerce_custom_metrics(&form).is_empty());

        let form = CaseStudyForm {
            custom_metrics: Some(json!({"name": "not an array"})),
            ..Default::default()
        };
        assert!(coerce_custom_metrics(&form).is_empty());
    }

    #[test]
    fn test_malformed_entries_dropped_individually() {
        let form = CaseStudyForm {
            custom_metrics: Some(json!([
                {"name": "ok", "value": "1"},
                {"value": "missing name"},
                null
            ])),
            ..Default::default()
        };
        let metrics = coerce_custom_metrics(&form);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "ok");
    }
}
