// ABOUTME: Local-filesystem blob store, one file per object under a root directory

use crate::{validate_key, BlobStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Blob store that maps logical keys onto files under a root directory.
/// Used for local deployments and as the durable backend in tests.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalBlobStore { root: root.into() }
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut segments = Vec::new();
        for part in rel.components() {
            segments.push(part.as_os_str().to_str()?.to_string());
        }
        Some(segments.join("/"))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        debug!("Stored object at {}", path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        // Iterative directory walk; the prefix may end mid-filename
        // (e.g. "case-studies/acme/acme"), so filtering happens on the
        // reconstructed key, not on directory names.
        let mut keys = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::Io(e)),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.key_for(&path) {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, prefix: &str) -> StorageResult<()> {
        for key in self.list(prefix).await? {
            let path = self.root.join(&key);
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::Io(e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store
            .put("case-studies/acme/metadata.json", b"{}".to_vec())
            .await
            .unwrap();
        store
            .put("case-studies/acme/acme.docx", vec![0x50, 0x4b])
            .await
            .unwrap();

        assert_eq!(
            store.get("case-studies/acme/metadata.json").await.unwrap(),
            Some(b"{}".to_vec())
        );
        assert_eq!(store.get("case-studies/other/x").await.unwrap(), None);

        let keys = store.list("case-studies/acme/").await.unwrap();
        assert_eq!(
            keys,
            vec![
                "case-studies/acme/acme.docx",
                "case-studies/acme/metadata.json"
            ]
        );

        store.delete("case-studies/acme/").await.unwrap();
        assert!(store.list("case-studies/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_traversal_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let result = store.put("../escape.txt", vec![]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
