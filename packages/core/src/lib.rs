// ABOUTME: Core types, constants, and utilities for Casebook
// ABOUTME: Foundational package shared by the storage, labels, docgen, and casestudies packages

pub mod constants;
pub mod types;
pub mod utils;

// Re-export main types
pub use types::{
    BasicInfo, CaseStudy, CaseStudyForm, CaseStudyStatus, ContentSections, CustomMetric,
    DiagramRef, DiagramSection, Draft, DraftStatus, LabelSet, Metrics, Questionnaire,
    ReviewComment, TechnicalDetails, Workstream,
};

// Re-export constants
pub use constants::{
    case_study_prefix, draft_comments_key, draft_key, labels_key, main_document_key,
    metadata_key, one_pager_key, LABEL_CATEGORIES, METADATA_FILE,
};

// Re-export utilities
pub use utils::{generate_draft_id, slugify, truncate};
