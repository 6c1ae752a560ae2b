use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Lifecycle status of a case study
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseStudyStatus {
    Draft,
    UnderReview,
    Approved,
    Rejected,
    Published,
}

impl Default for CaseStudyStatus {
    fn default() -> Self {
        CaseStudyStatus::Draft
    }
}

impl fmt::Display for CaseStudyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseStudyStatus::Draft => write!(f, "draft"),
            CaseStudyStatus::UnderReview => write!(f, "under_review"),
            CaseStudyStatus::Approved => write!(f, "approved"),
            CaseStudyStatus::Rejected => write!(f, "rejected"),
            CaseStudyStatus::Published => write!(f, "published"),
        }
    }
}

/// Lifecycle status of a draft (drafts are never published directly)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    UnderReview,
    Approved,
    Rejected,
}

impl Default for DraftStatus {
    fn default() -> Self {
        DraftStatus::Draft
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftStatus::Draft => write!(f, "draft"),
            DraftStatus::UnderReview => write!(f, "under_review"),
            DraftStatus::Approved => write!(f, "approved"),
            DraftStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Canonical label storage: category name to ordered list of display strings.
///
/// Insertion order is significant on both axes (label identity is positional,
/// duplicates are allowed), so this is backed by a Vec of pairs rather than a
/// map type, with hand-written serde impls that round-trip through a JSON
/// object without reordering keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    entries: Vec<(String, Vec<String>)>,
}

impl LabelSet {
    pub fn new() -> Self {
        LabelSet::default()
    }

    /// Ensure a category key exists, without adding values
    pub fn ensure_category(&mut self, category: &str) {
        if !self.entries.iter().any(|(c, _)| c == category) {
            self.entries.push((category.to_string(), Vec::new()));
        }
    }

    /// Append a value to a category, creating the category if needed
    pub fn push(&mut self, category: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((category.to_string(), vec![value])),
        }
    }

    /// Replace the values of a category wholesale
    pub fn set_values(&mut self, category: &str, values: Vec<String>) {
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((category.to_string(), values)),
        }
    }

    pub fn values(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, v)| v.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v.as_slice()))
    }

    /// True when no category holds any value (empty categories don't count)
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.is_empty())
    }

    /// Total number of label values across all categories
    pub fn value_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, values) in &self.entries {
            map.serialize_entry(category, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelSetVisitor;

        impl<'de> Visitor<'de> for LabelSetVisitor {
            type Value = LabelSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to list of label strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((category, values)) =
                    access.next_entry::<String, Vec<String>>()?
                {
                    entries.push((category, values));
                }
                Ok(LabelSet { entries })
            }
        }

        deserializer.deserialize_map(LabelSetVisitor)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// A user-defined metric attached to a case study
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomMetric {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
}

/// Reference to a diagram file held in the blob store
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiagramRef {
    #[serde(default, alias = "filename")]
    pub name: String,
    #[serde(
        rename = "s3Key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_key: Option<String>,
    #[serde(rename = "type", alias = "mimetype", default)]
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl DiagramRef {
    /// Whether this reference points at an embeddable raster image.
    /// SVG and non-image types (PDF etc.) are referenced by name only.
    pub fn is_image(&self) -> bool {
        let mime = self.file_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            return !mime.contains("svg");
        }
        let name = self.name.to_ascii_lowercase();
        [".png", ".jpg", ".jpeg", ".gif", ".bmp"]
            .iter()
            .any(|ext| name.ends_with(ext))
    }
}

/// A named implementation sub-section with its own description and diagrams
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Workstream {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub diagrams: Vec<DiagramRef>,
}

/// An architecture-diagram grouping; same wire shape as a workstream
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiagramSection {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub diagrams: Vec<DiagramRef>,
}

/// Basic-information header of a questionnaire
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_of_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
}

/// Narrative sections of a questionnaire.
/// `challenge`, `solution`, and `results` are mandatory at creation; the
/// document synthesizer still emits those sections with placeholder text if
/// they are empty on an old record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentSections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    pub challenge: String,
    pub solution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    pub implementation_workstreams: Vec<Workstream>,
    pub architecture_diagrams: Vec<DiagramSection>,
    pub results: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
}

/// The standard metrics block
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_improvement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_reduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_savings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_savings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_satisfaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_benefits: Option<String>,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self.performance_improvement.is_none()
            && self.cost_reduction.is_none()
            && self.cost_savings.is_none()
            && self.time_savings.is_none()
            && self.user_satisfaction.is_none()
            && self.other_benefits.is_none()
    }
}

/// Optional technical appendix
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalDetails {
    pub aws_services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
}

/// The canonical nested questionnaire attached to a case study
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Questionnaire {
    pub basic_info: BasicInfo,
    pub content: ContentSections,
    pub metrics: Metrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalDetails>,
}

/// The lifecycle-tracked, versioned record derived from a submitted draft
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub id: String,
    pub folder_name: String,
    pub original_title: String,
    #[serde(default)]
    pub status: CaseStudyStatus,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_draft_id: Option<String>,
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default)]
    pub custom_metrics: Vec<CustomMetric>,
    #[serde(default)]
    pub questionnaire: Questionnaire,
}

/// An unpublished, freely-editable case-study submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: CaseStudyForm,
}

/// A single review comment; the log is append-only and ordered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewComment {
    pub comment: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// The flat form shape submitted by the authoring UI.
///
/// Historical clients send `labels`, `customMetrics`, workstreams, and
/// diagram sections either as arrays or as JSON-encoded strings, and
/// sometimes only under a nested `questionnaire` object; those fields stay
/// as raw `Value`s here and go through one coercion step in the
/// casestudies package before anything downstream reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseStudyForm {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_of_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_improvement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_reduction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_savings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_savings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_satisfaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_benefits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metrics: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_workstreams: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture_diagrams: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<TechnicalDetails>,
    /// Legacy nested shape; consulted by coercion when root fields are absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<Value>,
}
