// ABOUTME: Persistence of the label taxonomy document at labels/labels.json

use casebook_core::constants::{labels_key, LABEL_CATEGORIES};
use casebook_core::types::LabelSet;
use casebook_storage::{BlobStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Label subsystem errors
#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Taxonomy serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LabelResult<T> = Result<T, LabelError>;

/// Loads and saves the category→values taxonomy document
pub struct LabelTaxonomy {
    store: Arc<dyn BlobStore>,
}

impl LabelTaxonomy {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        LabelTaxonomy { store }
    }

    /// The taxonomy shipped before any operator edits: all fixed categories,
    /// no values.
    pub fn default_taxonomy() -> LabelSet {
        let mut set = LabelSet::new();
        for category in LABEL_CATEGORIES {
            set.ensure_category(category);
        }
        set
    }

    /// Load the stored taxonomy, seeding defaults when absent. Stored
    /// documents missing newer fixed categories are backfilled on load.
    pub async fn load(&self) -> LabelResult<LabelSet> {
        let Some(bytes) = self.store.get(&labels_key()).await? else {
            return Ok(Self::default_taxonomy());
        };
        let mut set: LabelSet = serde_json::from_slice(&bytes)?;
        for category in LABEL_CATEGORIES {
            set.ensure_category(category);
        }
        Ok(set)
    }

    pub async fn save(&self, taxonomy: &LabelSet) -> LabelResult<()> {
        let bytes = serde_json::to_vec_pretty(taxonomy)?;
        self.store.put(&labels_key(), bytes).await?;
        info!("Saved label taxonomy ({} values)", taxonomy.value_count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_storage::MemoryBlobStore;

    #[tokio::test]
    async fn test_load_seeds_defaults_when_absent() {
        let taxonomy = LabelTaxonomy::new(Arc::new(MemoryBlobStore::new()));
        let set = taxonomy.load().await.unwrap();
        assert!(set.is_empty());
        assert_eq!(set.categories().count(), LABEL_CATEGORIES.len());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip_backfills_categories() {
        let store = Arc::new(MemoryBlobStore::new());
        let taxonomy = LabelTaxonomy::new(store.clone());

        let mut set = LabelSet::new();
        set.push("client", "Acme");
        taxonomy.save(&set).await.unwrap();

        let loaded = taxonomy.load().await.unwrap();
        assert_eq!(loaded.values("client"), Some(&["Acme".to_string()][..]));
        // Fixed categories reappear even though the saved doc lacked them
        assert!(loaded.values("Circles").is_some());
    }
}
