// ABOUTME: HTTP layer for the case-study service
// ABOUTME: Provides consistent response format across all API endpoints

use crate::lifecycle::LifecycleError;
use crate::repository::RepositoryError;
use crate::service::{CaseStudyService, ServiceError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
    routing::{delete, get, post, put},
    Json, Router,
};
use casebook_core::types::{CaseStudyForm, CaseStudyStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Convert service errors to HTTP responses
impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ServiceError::Validation(errors) => {
                let details: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                (StatusCode::BAD_REQUEST, details.join("; "))
            }
            ServiceError::DraftNotFound(_) | ServiceError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ServiceError::Lifecycle(LifecycleError::Immutable)
            | ServiceError::Lifecycle(LifecycleError::IllegalTransition { .. }) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServiceError::Repository(RepositoryError::Conflict { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ServiceError::Repository(RepositoryError::Duplicate(_)) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            ServiceError::Repository(RepositoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ServiceError::Storage(_) | ServiceError::Docgen(_) | ServiceError::Review(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ServiceError::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Serialization error".to_string(),
            ),
        };

        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}

pub type ServiceState = Arc<CaseStudyService>;

/// Request body for saving a draft
#[derive(Deserialize)]
pub struct SaveDraftRequest {
    #[serde(rename = "draftId")]
    pub draft_id: Option<String>,
    #[serde(flatten)]
    pub form: CaseStudyForm,
}

/// Request body for a status transition
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: CaseStudyStatus,
}

/// Request body for appending a review comment
#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub comment: String,
    #[serde(default = "anonymous")]
    pub author: String,
}

fn anonymous() -> String {
    "anonymous".to_string()
}

/// Optional status filter for listings
#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<CaseStudyStatus>,
}

/// Creates the case-studies API router
pub fn create_case_studies_router() -> Router<ServiceState> {
    Router::new()
        .route("/", get(list_case_studies))
        .route("/", post(create_or_submit))
        .route("/{folder_name}", get(get_case_study))
        .route("/{folder_name}", delete(delete_case_study))
        .route("/{folder_name}/status", put(update_status))
        .route("/{folder_name}/feedback", post(incorporate_feedback))
        .route("/{folder_name}/regenerate", post(regenerate_documents))
        .route("/drafts", get(list_drafts))
        .route("/drafts", post(save_draft))
        .route("/drafts/{id}", get(get_draft))
        .route("/drafts/{id}/submit", post(submit_draft))
        .route("/drafts/{id}/approve", post(approve_draft))
        .route("/drafts/{id}/reject", post(reject_draft))
        .route("/drafts/{id}/comments", get(list_comments))
        .route("/drafts/{id}/comments", post(add_comment))
}

/// List case studies, optionally filtered by status
async fn list_case_studies(
    State(service): State<ServiceState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match service.list_case_studies().await {
        Ok(mut studies) => {
            if let Some(status) = query.status {
                studies.retain(|c| c.status == status);
            }
            info!("Retrieved {} case studies", studies.len());
            (StatusCode::OK, ResponseJson(ApiResponse::success(studies))).into_response()
        }
        Err(e) => {
            error!("Failed to list case studies: {}", e);
            e.into_response()
        }
    }
}

/// Submit form data for review, creating or superseding a case study
async fn create_or_submit(
    State(service): State<ServiceState>,
    Json(form): Json<CaseStudyForm>,
) -> impl IntoResponse {
    info!("Submitting case study: {}", form.title);

    match service.create_or_submit(form).await {
        Ok(case) => {
            (StatusCode::CREATED, ResponseJson(ApiResponse::success(case))).into_response()
        }
        Err(e) => {
            error!("Failed to submit case study: {}", e);
            e.into_response()
        }
    }
}

/// Get a specific case study by folder name
async fn get_case_study(
    State(service): State<ServiceState>,
    Path(folder_name): Path<String>,
) -> impl IntoResponse {
    match service.get_case_study(&folder_name).await {
        Ok(Some(case)) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(case))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            ResponseJson(ApiResponse::<()>::error("Case study not found".to_string())),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to get case study {}: {}", folder_name, e);
            e.into_response()
        }
    }
}

/// Delete a case study and its stored documents
async fn delete_case_study(
    State(service): State<ServiceState>,
    Path(folder_name): Path<String>,
) -> impl IntoResponse {
    info!("Deleting case study: {}", folder_name);

    match service.delete_case_study(&folder_name).await {
        Ok(()) => (StatusCode::OK, ResponseJson(ApiResponse::success(()))).into_response(),
        Err(e) => {
            error!("Failed to delete case study {}: {}", folder_name, e);
            e.into_response()
        }
    }
}

/// Transition a case study's lifecycle status
async fn update_status(
    State(service): State<ServiceState>,
    Path(folder_name): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> impl IntoResponse {
    info!("Updating {} status to {}", folder_name, request.status);

    match service.update_status(&folder_name, request.status).await {
        Ok(case) => (StatusCode::OK, ResponseJson(ApiResponse::success(case))).into_response(),
        Err(e) => {
            error!("Failed to update status of {}: {}", folder_name, e);
            e.into_response()
        }
    }
}

/// Merge reviewer feedback into a case study and bump its version
async fn incorporate_feedback(
    State(service): State<ServiceState>,
    Path(folder_name): Path<String>,
    Json(form): Json<CaseStudyForm>,
) -> impl IntoResponse {
    info!("Incorporating feedback on {}", folder_name);

    match service.incorporate_feedback(&folder_name, form).await {
        Ok(case) => (StatusCode::OK, ResponseJson(ApiResponse::success(case))).into_response(),
        Err(e) => {
            error!("Failed to incorporate feedback on {}: {}", folder_name, e);
            e.into_response()
        }
    }
}

/// Regenerate both documents for an existing case study and store them
async fn regenerate_documents(
    State(service): State<ServiceState>,
    Path(folder_name): Path<String>,
) -> impl IntoResponse {
    info!("Regenerating documents for {}", folder_name);

    match service.regenerate_documents(&folder_name).await {
        Ok(()) => (StatusCode::OK, ResponseJson(ApiResponse::success(()))).into_response(),
        Err(e) => {
            error!("Failed to regenerate documents for {}: {}", folder_name, e);
            e.into_response()
        }
    }
}

/// List all drafts
async fn list_drafts(State(service): State<ServiceState>) -> impl IntoResponse {
    match service.list_drafts().await {
        Ok(drafts) => (StatusCode::OK, ResponseJson(ApiResponse::success(drafts))).into_response(),
        Err(e) => {
            error!("Failed to list drafts: {}", e);
            e.into_response()
        }
    }
}

/// Create or update a draft
async fn save_draft(
    State(service): State<ServiceState>,
    Json(request): Json<SaveDraftRequest>,
) -> impl IntoResponse {
    info!("Saving draft: {}", request.form.title);

    match service
        .save_draft(request.form, request.draft_id.as_deref())
        .await
    {
        Ok(draft) => {
            (StatusCode::CREATED, ResponseJson(ApiResponse::success(draft))).into_response()
        }
        Err(e) => {
            error!("Failed to save draft: {}", e);
            e.into_response()
        }
    }
}

/// Get a specific draft by ID
async fn get_draft(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match service.get_draft(&id).await {
        Ok(Some(draft)) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(draft))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            ResponseJson(ApiResponse::<()>::error("Draft not found".to_string())),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to get draft {}: {}", id, e);
            e.into_response()
        }
    }
}

/// Submit a draft for review
async fn submit_draft(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Submitting draft for review: {}", id);

    match service.submit_draft(&id).await {
        Ok(case) => {
            (StatusCode::CREATED, ResponseJson(ApiResponse::success(case))).into_response()
        }
        Err(e) => {
            error!("Failed to submit draft {}: {}", id, e);
            e.into_response()
        }
    }
}

/// Approve a draft, generating the case-study documents
async fn approve_draft(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Approving draft: {}", id);

    match service.approve(&id).await {
        Ok(case) => (StatusCode::OK, ResponseJson(ApiResponse::success(case))).into_response(),
        Err(e) => {
            error!("Failed to approve draft {}: {}", id, e);
            e.into_response()
        }
    }
}

/// Reject a draft
async fn reject_draft(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("Rejecting draft: {}", id);

    match service.reject(&id).await {
        Ok(case) => (StatusCode::OK, ResponseJson(ApiResponse::success(case))).into_response(),
        Err(e) => {
            error!("Failed to reject draft {}: {}", id, e);
            e.into_response()
        }
    }
}

/// List review comments for a draft
async fn list_comments(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match service.list_comments(&id).await {
        Ok(comments) => {
            (StatusCode::OK, ResponseJson(ApiResponse::success(comments))).into_response()
        }
        Err(e) => {
            error!("Failed to list comments for {}: {}", id, e);
            e.into_response()
        }
    }
}

/// Append a review comment to a draft
async fn add_comment(
    State(service): State<ServiceState>,
    Path(id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> impl IntoResponse {
    match service
        .add_comment(&id, &request.comment, &request.author)
        .await
    {
        Ok(comment) => {
            (StatusCode::CREATED, ResponseJson(ApiResponse::success(comment))).into_response()
        }
        Err(e) => {
            error!("Failed to add comment on {}: {}", id, e);
            e.into_response()
        }
    }
}
