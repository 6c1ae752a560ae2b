// ABOUTME: Bounded-retry wrapper treating the blob store as a fallible network service

use crate::{BlobStore, StorageResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(200);

/// Wraps any blob store with bounded retries on `get` and `put`.
///
/// `list` and `delete` are best-effort and pass through unretried; reads and
/// writes are idempotent by key, so retrying them is always safe. After the
/// last attempt the final error surfaces to the caller unchanged.
pub struct RetryingBlobStore<S> {
    inner: S,
    attempts: u32,
    backoff: Duration,
}

impl<S: BlobStore> RetryingBlobStore<S> {
    pub fn new(inner: S) -> Self {
        RetryingBlobStore {
            inner,
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_policy(inner: S, attempts: u32, backoff: Duration) -> Self {
        RetryingBlobStore {
            inner,
            attempts: attempts.max(1),
            backoff,
        }
    }
}

#[async_trait]
impl<S: BlobStore> BlobStore for RetryingBlobStore<S> {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        for attempt in 1..self.attempts {
            match self.inner.put(key, bytes.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("put {} failed on attempt {}: {}", key, attempt, e);
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
        // Final attempt; its error surfaces unchanged
        self.inner.put(key, bytes).await
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        for attempt in 1..self.attempts {
            match self.inner.get(key).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    warn!("get {} failed on attempt {}: {}", key, attempt, e);
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
        self.inner.get(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    async fn delete(&self, prefix: &str) -> StorageResult<()> {
        self.inner.delete(prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::RwLock;

    /// Fails the first `fail_count` calls, then behaves like a memory store
    struct FlakyStore {
        fail_count: AtomicU32,
        objects: RwLock<std::collections::HashMap<String, Vec<u8>>>,
    }

    impl FlakyStore {
        fn failing(times: u32) -> Self {
            FlakyStore {
                fail_count: AtomicU32::new(times),
                objects: RwLock::new(std::collections::HashMap::new()),
            }
        }

        fn maybe_fail(&self) -> StorageResult<()> {
            let remaining = self.fail_count.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_count.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::Backend("transient".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
            self.maybe_fail()?;
            self.objects.write().await.insert(key.to_string(), bytes);
            Ok(())
        }

        async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
            self.maybe_fail()?;
            Ok(self.objects.read().await.get(key).cloned())
        }

        async fn list(&self, _prefix: &str) -> StorageResult<Vec<String>> {
            Ok(vec![])
        }

        async fn delete(&self, _prefix: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let store =
            RetryingBlobStore::with_policy(FlakyStore::failing(2), 3, Duration::from_millis(1));
        store.put("k", b"v".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_retry_exhaustion_surfaces_last_error() {
        let store =
            RetryingBlobStore::with_policy(FlakyStore::failing(10), 3, Duration::from_millis(1));
        let result = store.put("k", b"v".to_vec()).await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
    }
}
