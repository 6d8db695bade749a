use crate::adapters::memory::MemoryKv;
use crate::domain::ports::KvStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Primary backend mirrored into process memory.
///
/// Writes land in the mirror first and are then forwarded; a failed forward
/// is logged and the write still succeeds. Reads prefer the primary and use
/// the mirror when the primary errors or holds nothing for the key.
#[derive(Clone)]
pub struct FallbackKv {
    primary: Arc<dyn KvStore>,
    mirror: MemoryKv,
}

impl FallbackKv {
    pub fn new(primary: Arc<dyn KvStore>) -> Self {
        Self {
            primary,
            mirror: MemoryKv::new(),
        }
    }

    pub fn mirror(&self) -> &MemoryKv {
        &self.mirror
    }
}

#[async_trait]
impl KvStore for FallbackKv {
    fn backend(&self) -> &'static str {
        self.primary.backend()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.primary.get(key).await {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => self.mirror.get(key).await,
            Err(e) => {
                tracing::warn!(
                    "{} store read of '{}' failed, serving in-memory copy: {}",
                    self.primary.backend(),
                    key,
                    e
                );
                self.mirror.get(key).await
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mirror.set(key, value).await?;
        if let Err(e) = self.primary.set(key, value).await {
            tracing::warn!(
                "{} store write of '{}' failed, kept in memory only: {}",
                self.primary.backend(),
                key,
                e
            );
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.mirror.delete(key).await?;
        if let Err(e) = self.primary.delete(key).await {
            tracing::warn!(
                "{} store delete of '{}' failed: {}",
                self.primary.backend(),
                key,
                e
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LeaderboardError;

    struct Unreachable;

    #[async_trait]
    impl KvStore for Unreachable {
        fn backend(&self) -> &'static str {
            "rest"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(LeaderboardError::store("rest", "connection refused"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(LeaderboardError::store("rest", "connection refused"))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(LeaderboardError::store("rest", "connection refused"))
        }
    }

    #[tokio::test]
    async fn test_unreachable_primary_serves_mirror() {
        let kv = FallbackKv::new(Arc::new(Unreachable));
        assert_eq!(kv.backend(), "rest");

        kv.set("gcsl-data", "[]").await.unwrap();
        assert_eq!(kv.get("gcsl-data").await.unwrap().as_deref(), Some("[]"));

        kv.delete("gcsl-data").await.unwrap();
        assert_eq!(kv.get("gcsl-data").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_primary_value_wins_over_mirror() {
        let primary = MemoryKv::new();
        primary.set("gcsl-data", "primary").await.unwrap();

        let kv = FallbackKv::new(Arc::new(primary.clone()));
        kv.mirror().set("gcsl-data", "stale").await.unwrap();
        assert_eq!(kv.get("gcsl-data").await.unwrap().as_deref(), Some("primary"));

        kv.set("gcsl-data", "fresh").await.unwrap();
        assert_eq!(primary.get("gcsl-data").await.unwrap().as_deref(), Some("fresh"));
    }
}
