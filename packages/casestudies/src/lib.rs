// ABOUTME: Case-study lifecycle: drafts, review, versioning, publication
// ABOUTME: Service layer plus HTTP API over the repository and blob store

pub mod api;
pub mod coerce;
pub mod lifecycle;
pub mod repository;
pub mod reviews;
pub mod service;
pub mod validator;
pub mod version;

pub use api::{create_case_studies_router, ApiResponse, ServiceState};
pub use lifecycle::{apply_status, can_transition, LifecycleError};
pub use repository::{
    CaseStudyRepository, MemoryRepository, RepositoryError, StoredCaseStudy,
};
pub use reviews::{ReviewError, ReviewLog};
pub use service::{CaseStudyService, ServiceError, ServiceResult};
pub use validator::{validate_draft, validate_submission, ValidationError};
pub use version::{next_feedback_version, INITIAL_VERSION, PUBLISHED_VERSION};
