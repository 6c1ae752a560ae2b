// ABOUTME: Document synthesis engine for Casebook
// ABOUTME: Pure case-study -> block synthesis, image embedding, and OOXML packaging

use casebook_core::types::CaseStudy;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

pub mod blocks;
pub mod docx;
pub mod embed;
pub mod layout;
pub mod sections;

pub use blocks::Block;
pub use docx::render;
pub use embed::{ImageEmbedder, ResolvedImages};
pub use layout::{fit_dimensions, ContentBox, RenderMode};
pub use sections::{synthesize, SectionDescriptor, SynthesisContext, SECTIONS};

/// Document generation errors
#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("Document packaging error: {0}")]
    Pack(String),
}

pub type DocgenResult<T> = Result<T, DocgenError>;

/// The two generated renderings of a case study
pub struct GeneratedDocuments {
    pub main_doc: Vec<u8>,
    pub one_pager: Vec<u8>,
}

/// Generate both document renderings for a case study.
///
/// Image bytes are resolved once and shared by both modes; synthesis itself
/// is a pure function of the case study and the resolved images, so the
/// CPU-bound packaging step runs on the blocking pool.
pub async fn generate_documents(
    case: &CaseStudy,
    embedder: &ImageEmbedder,
) -> DocgenResult<GeneratedDocuments> {
    let images = embedder.resolve_all(case).await;
    let generated_on = Utc::now();

    let main_blocks = synthesize(&SynthesisContext {
        case,
        mode: RenderMode::Full,
        images: &images,
        generated_on,
    });
    let one_pager_blocks = synthesize(&SynthesisContext {
        case,
        mode: RenderMode::OnePager,
        images: &images,
        generated_on,
    });

    let (main_doc, one_pager) = tokio::task::spawn_blocking(move || -> DocgenResult<_> {
        let main_doc = render(&main_blocks, RenderMode::Full)?;
        let one_pager = render(&one_pager_blocks, RenderMode::OnePager)?;
        Ok((main_doc, one_pager))
    })
    .await
    .map_err(|e| DocgenError::Pack(e.to_string()))??;

    info!(
        "Generated documents for '{}' ({} + {} bytes)",
        case.folder_name,
        main_doc.len(),
        one_pager.len()
    );

    Ok(GeneratedDocuments {
        main_doc,
        one_pager,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_core::types::{CaseStudy, CaseStudyStatus, Questionnaire};
    use casebook_storage::MemoryBlobStore;
    use std::sync::Arc;

    fn minimal_case() -> CaseStudy {
        let mut questionnaire = Questionnaire::default();
        questionnaire.basic_info.title = "cst12".to_string();
        questionnaire.content.challenge = "c".to_string();
        questionnaire.content.solution = "s".to_string();
        questionnaire.content.results = "r".to_string();
        CaseStudy {
            id: "id1".to_string(),
            folder_name: "cst12".to_string(),
            original_title: "cst12".to_string(),
            status: CaseStudyStatus::UnderReview,
            version: "0.1".to_string(),
            previous_version: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            approved_at: None,
            rejected_at: None,
            original_draft_id: None,
            labels: Default::default(),
            custom_metrics: vec![],
            questionnaire,
        }
    }

    #[tokio::test]
    async fn test_generate_documents_produces_both_buffers() {
        let embedder = ImageEmbedder::new(Arc::new(MemoryBlobStore::new()));
        let documents = generate_documents(&minimal_case(), &embedder)
            .await
            .unwrap();

        // OOXML packages are zip archives: PK magic
        assert_eq!(&documents.main_doc[..2], b"PK");
        assert_eq!(&documents.one_pager[..2], b"PK");
    }
}
