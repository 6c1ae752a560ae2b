// ABOUTME: Append-only review-comment log persisted per draft/case-study id

use casebook_core::constants::draft_comments_key;
use casebook_core::types::ReviewComment;
use casebook_storage::{BlobStore, StorageError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Review-log errors
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Comment log serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReviewResult<T> = Result<T, ReviewError>;

/// Ordered, append-only comment log keyed by draft/case-study id
pub struct ReviewLog {
    store: Arc<dyn BlobStore>,
}

impl ReviewLog {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        ReviewLog { store }
    }

    pub async fn list(&self, id: &str) -> ReviewResult<Vec<ReviewComment>> {
        match self.store.get(&draft_comments_key(id)).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append a comment and persist the whole log. Author identity is a
    /// free-text string; there is no authentication.
    pub async fn append(&self, id: &str, comment: &str, author: &str) -> ReviewResult<ReviewComment> {
        let mut comments = self.list(id).await?;
        let entry = ReviewComment {
            comment: comment.to_string(),
            author: author.to_string(),
            timestamp: Utc::now(),
        };
        comments.push(entry.clone());
        let bytes = serde_json::to_vec_pretty(&comments)?;
        self.store.put(&draft_comments_key(id), bytes).await?;
        info!("Appended review comment #{} on {}", comments.len(), id);
        Ok(entry)
    }
}
