// ABOUTME: Blob-store data layer for Casebook
// ABOUTME: Key/value store trait with in-memory and local-filesystem backends

use async_trait::async_trait;
use thiserror::Error;

pub mod local;
pub mod memory;
pub mod retry;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use retry::RetryingBlobStore;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key/value blob store the rest of the system persists through.
///
/// Keys are `/`-separated logical paths (`case-studies/{folder}/...`). A
/// missing object is `Ok(None)` from `get`, never an error; errors mean the
/// backend itself failed. `delete` removes every object under a prefix and
/// is a no-op when nothing matches.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()>;
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;
    async fn delete(&self, prefix: &str) -> StorageResult<()>;
}

/// Reject keys that could escape the store's namespace
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("case-studies/acme/metadata.json").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/absolute").is_err());
        assert!(validate_key("a/../b").is_err());
    }
}
