// ABOUTME: Repository abstraction over draft and case-study records
// ABOUTME: compare_and_swap turns concurrent lifecycle races into detectable conflicts

use async_trait::async_trait;
use casebook_core::types::{CaseStudy, Draft};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Concurrent modification of '{folder_name}': expected rev {expected}, found {actual}")]
    Conflict {
        folder_name: String,
        expected: u64,
        actual: u64,
    },
    #[error("Case study '{0}' already exists")]
    Duplicate(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// A case study together with its repository revision. `rev` is internal
/// optimistic-concurrency bookkeeping, distinct from the user-facing
/// document version tag.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCaseStudy {
    pub rev: u64,
    pub case_study: CaseStudy,
}

/// The sole owner of draft and case-study lifecycle state. Every mutation
/// of an existing case study goes through `compare_and_swap`; there is no
/// unconditional overwrite.
#[async_trait]
pub trait CaseStudyRepository: Send + Sync {
    // Drafts (keyed by id; saves are upserts, drafts have no revision)
    async fn save_draft(&self, draft: Draft) -> RepoResult<Draft>;
    async fn get_draft(&self, id: &str) -> RepoResult<Option<Draft>>;
    async fn list_drafts(&self) -> RepoResult<Vec<Draft>>;

    // Case studies (keyed by folder name)
    async fn insert_case_study(&self, case_study: CaseStudy) -> RepoResult<StoredCaseStudy>;
    async fn get_case_study(&self, folder_name: &str) -> RepoResult<Option<StoredCaseStudy>>;
    async fn find_by_original_draft(&self, draft_id: &str)
        -> RepoResult<Option<StoredCaseStudy>>;
    async fn list_case_studies(&self) -> RepoResult<Vec<StoredCaseStudy>>;
    async fn compare_and_swap(
        &self,
        folder_name: &str,
        expected_rev: u64,
        case_study: CaseStudy,
    ) -> RepoResult<StoredCaseStudy>;
    async fn delete_case_study(&self, folder_name: &str) -> RepoResult<()>;
}

#[derive(Default)]
struct RepoState {
    drafts: HashMap<String, Draft>,
    case_studies: HashMap<String, StoredCaseStudy>,
    next_rev: u64,
}

/// In-memory repository for single-process deployments and tests
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<RepoState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        MemoryRepository::default()
    }
}

#[async_trait]
impl CaseStudyRepository for MemoryRepository {
    async fn save_draft(&self, draft: Draft) -> RepoResult<Draft> {
        let mut state = self.state.write().await;
        state.drafts.insert(draft.id.clone(), draft.clone());
        Ok(draft)
    }

    async fn get_draft(&self, id: &str) -> RepoResult<Option<Draft>> {
        Ok(self.state.read().await.drafts.get(id).cloned())
    }

    async fn list_drafts(&self) -> RepoResult<Vec<Draft>> {
        let state = self.state.read().await;
        let mut drafts: Vec<Draft> = state.drafts.values().cloned().collect();
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(drafts)
    }

    async fn insert_case_study(&self, case_study: CaseStudy) -> RepoResult<StoredCaseStudy> {
        let mut state = self.state.write().await;
        let folder_name = case_study.folder_name.clone();
        if state.case_studies.contains_key(&folder_name) {
            return Err(RepositoryError::Duplicate(folder_name));
        }
        state.next_rev += 1;
        let stored = StoredCaseStudy {
            rev: state.next_rev,
            case_study,
        };
        state.case_studies.insert(folder_name, stored.clone());
        Ok(stored)
    }

    async fn get_case_study(&self, folder_name: &str) -> RepoResult<Option<StoredCaseStudy>> {
        Ok(self.state.read().await.case_studies.get(folder_name).cloned())
    }

    async fn find_by_original_draft(
        &self,
        draft_id: &str,
    ) -> RepoResult<Option<StoredCaseStudy>> {
        let state = self.state.read().await;
        Ok(state
            .case_studies
            .values()
            .find(|stored| stored.case_study.original_draft_id.as_deref() == Some(draft_id))
            .cloned())
    }

    async fn list_case_studies(&self) -> RepoResult<Vec<StoredCaseStudy>> {
        let state = self.state.read().await;
        let mut studies: Vec<StoredCaseStudy> = state.case_studies.values().cloned().collect();
        studies.sort_by(|a, b| b.case_study.updated_at.cmp(&a.case_study.updated_at));
        Ok(studies)
    }

    async fn compare_and_swap(
        &self,
        folder_name: &str,
        expected_rev: u64,
        case_study: CaseStudy,
    ) -> RepoResult<StoredCaseStudy> {
        let mut state = self.state.write().await;
        let current = state
            .case_studies
            .get(folder_name)
            .ok_or_else(|| RepositoryError::NotFound(folder_name.to_string()))?;
        if current.rev != expected_rev {
            return Err(RepositoryError::Conflict {
                folder_name: folder_name.to_string(),
                expected: expected_rev,
                actual: current.rev,
            });
        }
        state.next_rev += 1;
        let stored = StoredCaseStudy {
            rev: state.next_rev,
            case_study,
        };
        state
            .case_studies
            .insert(folder_name.to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete_case_study(&self, folder_name: &str) -> RepoResult<()> {
        let mut state = self.state.write().await;
        state
            .case_studies
            .remove(folder_name)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(folder_name.to_string()))
    }
}
