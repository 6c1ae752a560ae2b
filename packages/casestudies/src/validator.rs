// ABOUTME: Mandatory-field validation for case-study submissions

use casebook_core::types::CaseStudyForm;

/// Validation errors for submitted form data
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Validates a submission: title, challenge, solution, and results are
/// mandatory at creation. Nothing is written when validation fails.
pub fn validate_submission(form: &CaseStudyForm) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if form.title.trim().is_empty() {
        errors.push(ValidationError::new("title", "Title is required"));
    }
    if is_blank(&form.challenge) {
        errors.push(ValidationError::new("challenge", "Challenge is required"));
    }
    if is_blank(&form.solution) {
        errors.push(ValidationError::new("solution", "Solution is required"));
    }
    if is_blank(&form.results) {
        errors.push(ValidationError::new("results", "Results are required"));
    }

    errors
}

/// Validates a draft save: only a title is needed while authoring
pub fn validate_draft(form: &CaseStudyForm) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if form.title.trim().is_empty() {
        errors.push(ValidationError::new("title", "Title is required"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> CaseStudyForm {
        CaseStudyForm {
            title: "cst12".to_string(),
            challenge: Some("c".to_string()),
            solution: Some("s".to_string()),
            results: Some("r".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_submission_passes() {
        assert!(validate_submission(&complete_form()).is_empty());
    }

    #[test]
    fn test_each_mandatory_field_is_reported() {
        let form = CaseStudyForm {
            title: "  ".to_string(),
            challenge: None,
            solution: Some("".to_string()),
            results: None,
            ..Default::default()
        };
        let errors = validate_submission(&form);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "challenge", "solution", "results"]);
    }

    #[test]
    fn test_draft_only_needs_title() {
        let form = CaseStudyForm {
            title: "work in progress".to_string(),
            ..Default::default()
        };
        assert!(validate_draft(&form).is_empty());
        assert!(validate_submission(&form).len() == 3);
    }
}
