// ABOUTME: Blob-store key layout and fixed taxonomy constants
// ABOUTME: Every key used against the blob store is built here, nowhere else

/// Fixed label taxonomy categories. Unknown categories coming from the API
/// are passed through in addition to these, never instead of them.
pub const LABEL_CATEGORIES: &[&str] = &[
    "client",
    "sector",
    "projectType",
    "technology",
    "objective",
    "solution",
    "methodology",
    "region",
    "Circles",
];

/// File name of the canonical case-study record inside its folder
pub const METADATA_FILE: &str = "metadata.json";

/// Prefix holding every object that belongs to one case study
pub fn case_study_prefix(folder_name: &str) -> String {
    format!("case-studies/{}/", folder_name)
}

/// Key of the full generated document
pub fn main_document_key(folder_name: &str) -> String {
    format!("case-studies/{}/{}.docx", folder_name, folder_name)
}

/// Key of the generated one-pager
pub fn one_pager_key(folder_name: &str) -> String {
    format!("case-studies/{}/{}-one-pager.docx", folder_name, folder_name)
}

/// Key of the canonical case-study record
pub fn metadata_key(folder_name: &str) -> String {
    format!("case-studies/{}/{}", folder_name, METADATA_FILE)
}

/// Key of a stored draft
pub fn draft_key(draft_id: &str) -> String {
    format!("drafts/{}/draft.json", draft_id)
}

/// Key of the review-comment log for a draft or case study
pub fn draft_comments_key(draft_id: &str) -> String {
    format!("draft-reviews/{}/comments.json", draft_id)
}

/// Key of the label taxonomy document
pub fn labels_key() -> String {
    "labels/labels.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            main_document_key("acme-migration"),
            "case-studies/acme-migration/acme-migration.docx"
        );
        assert_eq!(
            one_pager_key("acme-migration"),
            "case-studies/acme-migration/acme-migration-one-pager.docx"
        );
        assert_eq!(
            metadata_key("acme-migration"),
            "case-studies/acme-migration/metadata.json"
        );
        assert_eq!(draft_key("a1B2c3D4"), "drafts/a1B2c3D4/draft.json");
        assert_eq!(
            draft_comments_key("a1B2c3D4"),
            "draft-reviews/a1B2c3D4/comments.json"
        );
    }
}
