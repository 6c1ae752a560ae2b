// ABOUTME: Service layer implementing the case-study operations end to end
// ABOUTME: Composes repository, lifecycle, labels, reviews, and document generation

use crate::coerce::{
    coerce_custom_metrics, coerce_diagram_sections, coerce_workstreams, has_custom_metrics,
    has_diagram_sections, has_workstreams,
};
use crate::lifecycle::{apply_status, LifecycleError};
use crate::repository::{CaseStudyRepository, RepositoryError, StoredCaseStudy};
use crate::reviews::{ReviewError, ReviewLog};
use crate::validator::{validate_draft, validate_submission, ValidationError};
use crate::version::{next_feedback_version, INITIAL_VERSION};
use casebook_core::constants::{
    case_study_prefix, draft_key, main_document_key, metadata_key, one_pager_key,
};
use casebook_core::types::{
    BasicInfo, CaseStudy, CaseStudyForm, CaseStudyStatus, ContentSections, Draft, DraftStatus,
    LabelSet, Metrics, Questionnaire, ReviewComment,
};
use casebook_core::utils::{generate_draft_id, slugify, truncate};
use casebook_docgen::{DocgenError, GeneratedDocuments, ImageEmbedder};
use casebook_labels::normalize;
use casebook_storage::{BlobStore, RetryingBlobStore, StorageError};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Validation errors: {0:?}")]
    Validation(Vec<ValidationError>),
    #[error("Draft not found: {0}")]
    DraftNotFound(String),
    #[error("Case study not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Document generation error: {0}")]
    Docgen(#[from] DocgenError),
    #[error("Review log error: {0}")]
    Review(#[from] ReviewError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// The case-study service: the only entry point through which lifecycle
/// state changes. Wraps the repository (sole owner of records), the blob
/// store (documents, metadata, draft copies), the review log, and the
/// document generator.
pub struct CaseStudyService {
    repo: Arc<dyn CaseStudyRepository>,
    blobs: Arc<dyn BlobStore>,
    embedder: ImageEmbedder,
    reviews: ReviewLog,
}

impl CaseStudyService {
    pub fn new(repo: Arc<dyn CaseStudyRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        CaseStudyService {
            embedder: ImageEmbedder::new(blobs.clone()),
            reviews: ReviewLog::new(blobs.clone()),
            repo,
            blobs,
        }
    }

    /// Build a service whose blob traffic goes through bounded retries, so
    /// transient storage failures surface only after the retry budget is
    /// spent. This is the constructor deployments should reach for.
    pub fn with_retrying_store<S>(repo: Arc<dyn CaseStudyRepository>, store: S) -> Self
    where
        S: BlobStore + 'static,
    {
        Self::new(repo, Arc::new(RetryingBlobStore::new(store)))
    }

    // ----- Drafts -----

    /// Create or update a draft. Drafts only need a title; everything else
    /// may still be in flight.
    pub async fn save_draft(
        &self,
        form: CaseStudyForm,
        existing_id: Option<&str>,
    ) -> ServiceResult<Draft> {
        let errors = validate_draft(&form);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let now = Utc::now();
        let draft = match existing_id {
            Some(id) => {
                let mut existing = self
                    .repo
                    .get_draft(id)
                    .await?
                    .ok_or_else(|| ServiceError::DraftNotFound(id.to_string()))?;
                existing.title = form.title.clone();
                existing.updated_at = now;
                existing.data = form;
                existing
            }
            None => Draft {
                id: generate_draft_id(),
                title: form.title.clone(),
                status: DraftStatus::Draft,
                created_at: now,
                updated_at: now,
                data: form,
            },
        };

        let draft = self.repo.save_draft(draft).await?;
        self.persist_draft(&draft).await?;
        info!("Saved draft '{}' (ID: {})", truncate(&draft.title, 60), draft.id);
        Ok(draft)
    }

    pub async fn get_draft(&self, id: &str) -> ServiceResult<Option<Draft>> {
        Ok(self.repo.get_draft(id).await?)
    }

    pub async fn list_drafts(&self) -> ServiceResult<Vec<Draft>> {
        Ok(self.repo.list_drafts().await?)
    }

    // ----- Submission / review cycle -----

    /// Submit form data straight for review. Creates a fresh case study at
    /// the initial version, or starts a new review cycle on the existing
    /// record for the same folder instead of creating a duplicate.
    pub async fn create_or_submit(&self, form: CaseStudyForm) -> ServiceResult<CaseStudy> {
        self.submit_form(form, None).await
    }

    /// Submit an existing draft for review, linking the resulting case
    /// study back to the draft. The draft itself is retained.
    pub async fn submit_draft(&self, draft_id: &str) -> ServiceResult<CaseStudy> {
        let mut draft = self
            .repo
            .get_draft(draft_id)
            .await?
            .ok_or_else(|| ServiceError::DraftNotFound(draft_id.to_string()))?;

        let case = self.submit_form(draft.data.clone(), Some(draft_id)).await?;

        draft.status = DraftStatus::UnderReview;
        draft.updated_at = Utc::now();
        let draft = self.repo.save_draft(draft).await?;
        self.persist_draft(&draft).await?;
        Ok(case)
    }

    async fn submit_form(
        &self,
        form: CaseStudyForm,
        original_draft_id: Option<&str>,
    ) -> ServiceResult<CaseStudy> {
        let errors = validate_submission(&form);
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let now = Utc::now();
        let folder_name = slugify(&form.title);

        let existing = match original_draft_id {
            Some(id) => self.repo.find_by_original_draft(id).await?,
            None => None,
        };
        let existing = match existing {
            Some(stored) => Some(stored),
            None => self.repo.get_case_study(&folder_name).await?,
        };

        let stored = match existing {
            Some(stored) => {
                // A fresh submission supersedes the prior outcome in place,
                // even a published one: this starts a new review cycle
                // rather than mutating published content silently.
                let mut case = stored.case_study;
                case.original_title = form.title.clone();
                case.questionnaire = questionnaire_from_form(&form);
                case.labels = labels_from_form(&form);
                case.custom_metrics = coerce_custom_metrics(&form);
                case.status = CaseStudyStatus::UnderReview;
                case.updated_at = now;
                let folder = case.folder_name.clone();
                self.repo.compare_and_swap(&folder, stored.rev, case).await?
            }
            None => {
                let case = CaseStudy {
                    id: generate_draft_id(),
                    folder_name,
                    original_title: form.title.clone(),
                    status: CaseStudyStatus::UnderReview,
                    version: INITIAL_VERSION.to_string(),
                    previous_version: None,
                    created_at: now,
                    updated_at: now,
                    approved_at: None,
                    rejected_at: None,
                    original_draft_id: original_draft_id.map(String::from),
                    labels: labels_from_form(&form),
                    custom_metrics: coerce_custom_metrics(&form),
                    questionnaire: questionnaire_from_form(&form),
                };
                self.repo.insert_case_study(case).await?
            }
        };

        self.persist_metadata(&stored.case_study).await?;
        info!(
            "Submitted '{}' for review at version {}",
            stored.case_study.folder_name, stored.case_study.version
        );
        Ok(stored.case_study)
    }

    /// Approve a draft: synthesize the case study from its data, generate
    /// both documents, then commit the record
    pub async fn approve(&self, draft_id: &str) -> ServiceResult<CaseStudy> {
        self.finalize_review(draft_id, CaseStudyStatus::Approved).await
    }

    /// Reject a draft. Mirrors approval: the outcome documents are still
    /// generated so reviewers can see what was rejected.
    pub async fn reject(&self, draft_id: &str) -> ServiceResult<CaseStudy> {
        self.finalize_review(draft_id, CaseStudyStatus::Rejected).await
    }

    async fn finalize_review(
        &self,
        draft_id: &str,
        outcome: CaseStudyStatus,
    ) -> ServiceResult<CaseStudy> {
        let mut draft = self
            .repo
            .get_draft(draft_id)
            .await?
            .ok_or_else(|| ServiceError::DraftNotFound(draft_id.to_string()))?;
        let now = Utc::now();
        let form = draft.data.clone();

        let existing = match self.repo.find_by_original_draft(draft_id).await? {
            Some(stored) => Some(stored),
            None => self.repo.get_case_study(&slugify(&draft.title)).await?,
        };

        // An existing record is the source of truth for content (it may
        // carry incorporated feedback the draft never saw); the draft data
        // only seeds a record when none exists yet.
        let (mut case, rev) = match existing {
            Some(StoredCaseStudy { rev, case_study }) => (case_study, Some(rev)),
            None => {
                let case = CaseStudy {
                    id: generate_draft_id(),
                    folder_name: slugify(&draft.title),
                    original_title: draft.title.clone(),
                    status: CaseStudyStatus::UnderReview,
                    version: INITIAL_VERSION.to_string(),
                    previous_version: None,
                    created_at: now,
                    updated_at: now,
                    approved_at: None,
                    rejected_at: None,
                    original_draft_id: Some(draft.id.clone()),
                    labels: labels_from_form(&form),
                    custom_metrics: coerce_custom_metrics(&form),
                    questionnaire: questionnaire_from_form(&form),
                };
                (case, None)
            }
        };

        case.original_draft_id = Some(draft.id.clone());
        apply_status(&mut case, outcome, now)?;

        // Generate-then-persist: both document buffers must be in the blob
        // store before the record is committed, so a storage failure cannot
        // leave an approved-but-documentless case study.
        self.generate_and_store_documents(&case).await?;

        let folder = case.folder_name.clone();
        let stored = match rev {
            Some(rev) => self.repo.compare_and_swap(&folder, rev, case).await?,
            None => self.repo.insert_case_study(case).await?,
        };
        self.persist_metadata(&stored.case_study).await?;

        // The draft is retained for history, with its outcome recorded
        draft.status = match outcome {
            CaseStudyStatus::Approved => DraftStatus::Approved,
            _ => DraftStatus::Rejected,
        };
        draft.updated_at = now;
        let draft = self.repo.save_draft(draft).await?;
        self.persist_draft(&draft).await?;

        info!(
            "{} draft {} as '{}' ({})",
            outcome, draft_id, stored.case_study.folder_name, stored.case_study.version
        );
        Ok(stored.case_study)
    }

    /// Revise an under-review case study with reviewer feedback: merge the
    /// changed fields over the existing record and bump the minor version.
    pub async fn incorporate_feedback(
        &self,
        folder_name: &str,
        form: CaseStudyForm,
    ) -> ServiceResult<CaseStudy> {
        let stored = self
            .repo
            .get_case_study(folder_name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(folder_name.to_string()))?;
        if stored.case_study.status == CaseStudyStatus::Published {
            return Err(LifecycleError::Immutable.into());
        }

        let mut case = stored.case_study;
        merge_form(&mut case, &form);

        let previous = case.version.clone();
        case.version = next_feedback_version(Some(&previous));
        case.previous_version = Some(previous);
        case.status = CaseStudyStatus::UnderReview;
        case.updated_at = Utc::now();

        let stored = self
            .repo
            .compare_and_swap(folder_name, stored.rev, case)
            .await?;
        self.persist_metadata(&stored.case_study).await?;
        info!(
            "Incorporated feedback on '{}': {} -> {}",
            folder_name,
            stored.case_study.previous_version.as_deref().unwrap_or("-"),
            stored.case_study.version
        );
        Ok(stored.case_study)
    }

    /// Transition a case study's status. Publishing pins the version at
    /// 1.0; published records reject any other change.
    pub async fn update_status(
        &self,
        folder_name: &str,
        status: CaseStudyStatus,
    ) -> ServiceResult<CaseStudy> {
        let stored = self
            .repo
            .get_case_study(folder_name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(folder_name.to_string()))?;

        let mut case = stored.case_study.clone();
        apply_status(&mut case, status, Utc::now())?;

        let stored = self
            .repo
            .compare_and_swap(folder_name, stored.rev, case)
            .await?;
        self.persist_metadata(&stored.case_study).await?;
        info!("Updated '{}' status to {}", folder_name, status);
        Ok(stored.case_study)
    }

    // ----- Queries and deletion -----

    pub async fn get_case_study(&self, folder_name: &str) -> ServiceResult<Option<CaseStudy>> {
        Ok(self
            .repo
            .get_case_study(folder_name)
            .await?
            .map(|stored| stored.case_study))
    }

    pub async fn list_case_studies(&self) -> ServiceResult<Vec<CaseStudy>> {
        Ok(self
            .repo
            .list_case_studies()
            .await?
            .into_iter()
            .map(|stored| stored.case_study)
            .collect())
    }

    /// Remove a case study and every object under its folder. Deleting is
    /// not a content mutation, so published records may be deleted too.
    pub async fn delete_case_study(&self, folder_name: &str) -> ServiceResult<()> {
        self.repo.delete_case_study(folder_name).await?;
        self.blobs.delete(&case_study_prefix(folder_name)).await?;
        info!("Deleted case study '{}'", folder_name);
        Ok(())
    }

    // ----- Review comments -----

    pub async fn add_comment(
        &self,
        id: &str,
        comment: &str,
        author: &str,
    ) -> ServiceResult<ReviewComment> {
        Ok(self.reviews.append(id, comment, author).await?)
    }

    pub async fn list_comments(&self, id: &str) -> ServiceResult<Vec<ReviewComment>> {
        Ok(self.reviews.list(id).await?)
    }

    // ----- Document generation -----

    /// Generate both document renderings without persisting them
    pub async fn generate_documents(
        &self,
        case: &CaseStudy,
    ) -> ServiceResult<GeneratedDocuments> {
        Ok(casebook_docgen::generate_documents(case, &self.embedder).await?)
    }

    /// Regenerate both documents for an existing case study and store them
    /// at their canonical keys, replacing whatever was there.
    pub async fn regenerate_documents(&self, folder_name: &str) -> ServiceResult<()> {
        let stored = self
            .repo
            .get_case_study(folder_name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(folder_name.to_string()))?;
        self.generate_and_store_documents(&stored.case_study).await?;
        info!("Regenerated documents for '{}'", folder_name);
        Ok(())
    }

    async fn generate_and_store_documents(&self, case: &CaseStudy) -> ServiceResult<()> {
        let documents = self.generate_documents(case).await?;
        self.blobs
            .put(&main_document_key(&case.folder_name), documents.main_doc)
            .await?;
        self.blobs
            .put(&one_pager_key(&case.folder_name), documents.one_pager)
            .await?;
        debug!("Stored generated documents for '{}'", case.folder_name);
        Ok(())
    }

    async fn persist_metadata(&self, case: &CaseStudy) -> ServiceResult<()> {
        let bytes = serde_json::to_vec_pretty(case)?;
        self.blobs
            .put(&metadata_key(&case.folder_name), bytes)
            .await?;
        Ok(())
    }

    async fn persist_draft(&self, draft: &Draft) -> ServiceResult<()> {
        let bytes = serde_json::to_vec_pretty(draft)?;
        self.blobs.put(&draft_key(&draft.id), bytes).await?;
        Ok(())
    }
}

/// Map the flat form shape into the canonical nested questionnaire
fn questionnaire_from_form(form: &CaseStudyForm) -> Questionnaire {
    Questionnaire {
        basic_info: BasicInfo {
            title: form.title.clone(),
            duration: form.duration.clone(),
            team_size: form.team_size.clone(),
            point_of_contact: form.point_of_contact.clone(),
            customer: form.customer.clone(),
            industry: form.industry.clone(),
            use_case: form.use_case.clone(),
        },
        content: ContentSections {
            overview: form.overview.clone(),
            challenge: form.challenge.clone().unwrap_or_default(),
            solution: form.solution.clone().unwrap_or_default(),
            implementation: form.implementation.clone(),
            implementation_workstreams: coerce_workstreams(form),
            architecture_diagrams: coerce_diagram_sections(form),
            results: form.results.clone().unwrap_or_default(),
            lessons_learned: form.lessons_learned.clone(),
            conclusion: form.conclusion.clone(),
            executive_summary: form.executive_summary.clone(),
        },
        metrics: Metrics {
            performance_improvement: form.performance_improvement.clone(),
            cost_reduction: form.cost_reduction.clone(),
            cost_savings: form.cost_savings.clone(),
            time_savings: form.time_savings.clone(),
            user_satisfaction: form.user_satisfaction.clone(),
            other_benefits: form.other_benefits.clone(),
        },
        technical: form.technical.clone(),
    }
}

fn labels_from_form(form: &CaseStudyForm) -> LabelSet {
    match &form.labels {
        Some(value) => normalize(value),
        None => normalize(&Value::Null),
    }
}

fn merge_text(target: &mut Option<String>, update: &Option<String>) {
    if let Some(value) = update {
        if !value.trim().is_empty() {
            *target = Some(value.clone());
        }
    }
}

/// Merge changed form fields over an existing record: fields absent from
/// the update retain their prior values. This is a merge, not a
/// replacement.
fn merge_form(case: &mut CaseStudy, form: &CaseStudyForm) {
    if !form.title.trim().is_empty() {
        case.original_title = form.title.clone();
        case.questionnaire.basic_info.title = form.title.clone();
    }

    let info = &mut case.questionnaire.basic_info;
    merge_text(&mut info.duration, &form.duration);
    merge_text(&mut info.team_size, &form.team_size);
    merge_text(&mut info.point_of_contact, &form.point_of_contact);
    merge_text(&mut info.customer, &form.customer);
    merge_text(&mut info.industry, &form.industry);
    merge_text(&mut info.use_case, &form.use_case);

    let content = &mut case.questionnaire.content;
    if let Some(challenge) = form.challenge.as_deref().filter(|s| !s.trim().is_empty()) {
        content.challenge = challenge.to_string();
    }
    if let Some(solution) = form.solution.as_deref().filter(|s| !s.trim().is_empty()) {
        content.solution = solution.to_string();
    }
    if let Some(results) = form.results.as_deref().filter(|s| !s.trim().is_empty()) {
        content.results = results.to_string();
    }
    merge_text(&mut content.overview, &form.overview);
    merge_text(&mut content.implementation, &form.implementation);
    merge_text(&mut content.lessons_learned, &form.lessons_learned);
    merge_text(&mut content.conclusion, &form.conclusion);
    merge_text(&mut content.executive_summary, &form.executive_summary);
    // Presence checks share the coercion layer's root-then-nested priority,
    // so a nested-only legacy payload replaces here exactly as it would on
    // a fresh submission.
    if has_workstreams(form) {
        content.implementation_workstreams = coerce_workstreams(form);
    }
    if has_diagram_sections(form) {
        content.architecture_diagrams = coerce_diagram_sections(form);
    }

    let metrics = &mut case.questionnaire.metrics;
    merge_text(&mut metrics.performance_improvement, &form.performance_improvement);
    merge_text(&mut metrics.cost_reduction, &form.cost_reduction);
    merge_text(&mut metrics.cost_savings, &form.cost_savings);
    merge_text(&mut metrics.time_savings, &form.time_savings);
    merge_text(&mut metrics.user_satisfaction, &form.user_satisfaction);
    merge_text(&mut metrics.other_benefits, &form.other_benefits);

    if form.labels.is_some() {
        case.labels = labels_from_form(form);
    }
    if has_custom_metrics(form) {
        case.custom_metrics = coerce_custom_metrics(form);
    }
    if form.technical.is_some() {
        case.questionnaire.technical = form.technical.clone();
    }
}
