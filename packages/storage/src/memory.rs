// ABOUTME: In-memory blob store used by tests and single-process deployments

use crate::{validate_key, BlobStore, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Blob store backed by a process-local map. Listing returns keys in
/// lexicographic order, matching what an object store prefix scan yields.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        MemoryBlobStore::default()
    }

    /// Number of stored objects, for test assertions
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().await;
        Ok(objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete(&self, prefix: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().await;
        objects.retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryBlobStore::new();
        store.put("a/b.txt", b"hello".to_vec()).await.unwrap();

        let bytes = store.get("a/b.txt").await.unwrap();
        assert_eq!(bytes, Some(b"hello".to_vec()));
        assert_eq!(store.get("a/missing.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_and_delete_by_prefix() {
        let store = MemoryBlobStore::new();
        store.put("drafts/1/draft.json", vec![1]).await.unwrap();
        store.put("drafts/2/draft.json", vec![2]).await.unwrap();
        store
            .put("case-studies/x/metadata.json", vec![3])
            .await
            .unwrap();

        let drafts = store.list("drafts/").await.unwrap();
        assert_eq!(drafts, vec!["drafts/1/draft.json", "drafts/2/draft.json"]);

        store.delete("drafts/").await.unwrap();
        assert!(store.list("drafts/").await.unwrap().is_empty());
        assert_eq!(store.object_count().await, 1);
    }
}
