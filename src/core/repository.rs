use crate::core::ranking::rank;
use crate::domain::model::{FixedRankings, Participant, RankedEntry};
use crate::domain::ports::KvStore;
use crate::utils::error::{LeaderboardError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_DATA_KEY: &str = "gcsl-data";
pub const DEFAULT_OVERRIDES_KEY: &str = "gcsl-fixed-rankings";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    pub participants: String,
    pub overrides: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            participants: DEFAULT_DATA_KEY.to_string(),
            overrides: DEFAULT_OVERRIDES_KEY.to_string(),
        }
    }
}

/// Participant and fixed-ranking snapshots. Every write replaces the stored
/// value as a whole.
///
/// Override mutations hold `overrides_lock` across their read and write, so
/// concurrent single-key updates through clones of one repository never
/// overwrite each other.
#[derive(Clone)]
pub struct LeaderboardRepository {
    kv: Arc<dyn KvStore>,
    keys: StoreKeys,
    overrides_lock: Arc<Mutex<()>>,
}

impl LeaderboardRepository {
    pub fn new(kv: Arc<dyn KvStore>, keys: StoreKeys) -> Self {
        Self {
            kv,
            keys,
            overrides_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.kv.backend()
    }

    pub async fn participants(&self) -> Result<Vec<Participant>> {
        match self.kv.get(&self.keys.participants).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn replace_participants(&self, participants: &[Participant]) -> Result<()> {
        let raw = serde_json::to_string(participants)?;
        self.kv.set(&self.keys.participants, &raw).await?;
        tracing::info!(
            "Stored {} participants in {} store",
            participants.len(),
            self.kv.backend()
        );
        Ok(())
    }

    pub async fn overrides(&self) -> Result<FixedRankings> {
        match self.kv.get(&self.keys.overrides).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(FixedRankings::new()),
        }
    }

    /// Replaces the whole mapping. Keys are normalized to trimmed lower-case
    /// emails; every rank must be at least 1.
    pub async fn replace_overrides(&self, overrides: FixedRankings) -> Result<()> {
        let normalized = normalize_overrides(overrides)?;
        let _guard = self.overrides_lock.lock().await;
        self.write_overrides(&normalized).await
    }

    pub async fn set_override(&self, email: &str, rank: u32) -> Result<()> {
        let key = normalize_email(email)?;
        check_rank(&key, rank)?;
        let _guard = self.overrides_lock.lock().await;
        let mut current = self.overrides().await?;
        current.insert(key, rank);
        self.write_overrides(&current).await
    }

    /// Returns whether an entry was removed. Removing an unknown email is not an error.
    pub async fn remove_override(&self, email: &str) -> Result<bool> {
        let key = normalize_email(email)?;
        let _guard = self.overrides_lock.lock().await;
        let mut current = self.overrides().await?;
        let removed = current.remove(&key).is_some();
        self.write_overrides(&current).await?;
        Ok(removed)
    }

    pub async fn leaderboard(&self) -> Result<Vec<RankedEntry>> {
        let participants = self.participants().await?;
        let overrides = self.overrides().await?;
        Ok(rank(&participants, &overrides))
    }

    /// An empty mapping deletes the key instead of storing `{}`.
    async fn write_overrides(&self, overrides: &FixedRankings) -> Result<()> {
        if overrides.is_empty() {
            self.kv.delete(&self.keys.overrides).await?;
            tracing::info!("Cleared fixed rankings");
            return Ok(());
        }
        let raw = serde_json::to_string(overrides)?;
        self.kv.set(&self.keys.overrides, &raw).await?;
        tracing::info!("Stored {} fixed rankings", overrides.len());
        Ok(())
    }
}

/// Validates an untyped JSON object of email -> rank as received from a client.
pub fn parse_overrides(value: &serde_json::Value) -> Result<FixedRankings> {
    let object = value
        .as_object()
        .ok_or_else(|| LeaderboardError::InvalidOverrideError {
            email: String::new(),
            reason: "payload must be an object".to_string(),
        })?;

    let mut overrides = FixedRankings::new();
    for (email, raw) in object {
        let rank = raw
            .as_u64()
            .or_else(|| {
                raw.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| LeaderboardError::InvalidOverrideError {
                email: email.clone(),
                reason: format!("{} is not a whole number", raw),
            })?;
        overrides.insert(email.clone(), rank);
    }
    normalize_overrides(overrides)
}

fn normalize_overrides(overrides: FixedRankings) -> Result<FixedRankings> {
    let mut normalized = FixedRankings::new();
    for (email, rank) in overrides {
        let key = normalize_email(&email)?;
        check_rank(&key, rank)?;
        normalized.insert(key, rank);
    }
    Ok(normalized)
}

fn normalize_email(email: &str) -> Result<String> {
    let key = email.trim().to_lowercase();
    if key.is_empty() {
        return Err(LeaderboardError::InvalidOverrideError {
            email: email.to_string(),
            reason: "email cannot be empty".to_string(),
        });
    }
    Ok(key)
}

fn check_rank(email: &str, rank: u32) -> Result<()> {
    if rank < 1 {
        return Err(LeaderboardError::InvalidOverrideError {
            email: email.to_string(),
            reason: "rank must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryKv;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    /// Memory store whose reads stall, widening the read-modify-write window.
    struct SlowReads(MemoryKv);

    #[async_trait]
    impl KvStore for SlowReads {
        fn backend(&self) -> &'static str {
            "slow"
        }

        async fn get(&self, key: &str) -> Result<Option<String>> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.0.delete(key).await
        }
    }

    fn repository() -> (LeaderboardRepository, MemoryKv) {
        let kv = MemoryKv::new();
        let repo = LeaderboardRepository::new(Arc::new(kv.clone()), StoreKeys::default());
        (repo, kv)
    }

    fn person(name: &str, skill: u32) -> Participant {
        Participant {
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            skill_badges: skill,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_store_reads_as_empty_snapshots() {
        let (repo, _) = repository();
        assert!(repo.participants().await.unwrap().is_empty());
        assert!(repo.overrides().await.unwrap().is_empty());
        assert!(repo.leaderboard().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_participants_is_wholesale() {
        let (repo, kv) = repository();
        repo.replace_participants(&[person("Amy", 3), person("Bob", 5)])
            .await
            .unwrap();
        repo.replace_participants(&[person("Cid", 1)]).await.unwrap();

        let stored = repo.participants().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Cid");

        let raw = kv.get(DEFAULT_DATA_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"Name\":\"Cid\""));
    }

    #[tokio::test]
    async fn test_overrides_are_normalized_and_validated() {
        let (repo, _) = repository();
        let overrides = FixedRankings::from([(" Amy@X.com ".to_string(), 2)]);
        repo.replace_overrides(overrides).await.unwrap();
        assert_eq!(repo.overrides().await.unwrap().get("amy@x.com"), Some(&2));

        let bad = FixedRankings::from([("bob@x.com".to_string(), 0)]);
        assert!(matches!(
            repo.replace_overrides(bad).await,
            Err(LeaderboardError::InvalidOverrideError { .. })
        ));
        assert_eq!(repo.overrides().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_and_remove_single_override() {
        let (repo, _) = repository();
        repo.set_override("Amy@x.com", 1).await.unwrap();
        repo.set_override("bob@x.com", 2).await.unwrap();

        assert!(repo.remove_override("AMY@X.COM").await.unwrap());
        assert!(!repo.remove_override("ghost@x.com").await.unwrap());

        let current = repo.overrides().await.unwrap();
        assert_eq!(current, FixedRankings::from([("bob@x.com".to_string(), 2)]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_override_removals_are_all_kept() {
        let kv = MemoryKv::new();
        let repo = LeaderboardRepository::new(
            Arc::new(SlowReads(kv.clone())),
            StoreKeys::default(),
        );
        repo.replace_overrides(FixedRankings::from([
            ("a@x.com".to_string(), 1),
            ("b@x.com".to_string(), 2),
            ("c@x.com".to_string(), 3),
        ]))
        .await
        .unwrap();

        let (first, second) = (repo.clone(), repo.clone());
        let (a, b) = tokio::join!(
            tokio::spawn(async move { first.remove_override("a@x.com").await }),
            tokio::spawn(async move { second.remove_override("b@x.com").await }),
        );
        assert!(a.unwrap().unwrap());
        assert!(b.unwrap().unwrap());

        let current = repo.overrides().await.unwrap();
        assert_eq!(current, FixedRankings::from([("c@x.com".to_string(), 3)]));
    }

    #[tokio::test]
    async fn test_concurrent_override_sets_are_all_kept() {
        let repo = LeaderboardRepository::new(
            Arc::new(SlowReads(MemoryKv::new())),
            StoreKeys::default(),
        );
        let (x, y) = tokio::join!(
            repo.set_override("x@x.com", 1),
            repo.set_override("y@x.com", 2),
        );
        x.unwrap();
        y.unwrap();
        assert_eq!(repo.overrides().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_removing_last_override_deletes_key() {
        let (repo, kv) = repository();
        repo.set_override("amy@x.com", 1).await.unwrap();
        assert!(kv.get(DEFAULT_OVERRIDES_KEY).await.unwrap().is_some());

        repo.remove_override("amy@x.com").await.unwrap();
        assert_eq!(kv.get(DEFAULT_OVERRIDES_KEY).await.unwrap(), None);
        assert!(repo.overrides().await.unwrap().is_empty());

        repo.set_override("bob@x.com", 2).await.unwrap();
        repo.replace_overrides(FixedRankings::new()).await.unwrap();
        assert_eq!(kv.get(DEFAULT_OVERRIDES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_leaderboard_applies_overrides() {
        let (repo, _) = repository();
        repo.replace_participants(&[person("Amy", 9), person("Bob", 1)])
            .await
            .unwrap();
        repo.set_override("bob@x.com", 1).await.unwrap();

        let board = repo.leaderboard().await.unwrap();
        assert_eq!(board[0].participant.name, "Bob");
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn test_parse_overrides_payload() {
        let parsed = parse_overrides(&json!({"A@x.com": 1, "b@x.com": 3.0})).unwrap();
        assert_eq!(parsed.get("a@x.com"), Some(&1));
        assert_eq!(parsed.get("b@x.com"), Some(&3));

        assert!(parse_overrides(&json!({"a@x.com": "1"})).is_err());
        assert!(parse_overrides(&json!({"a@x.com": 0})).is_err());
        assert!(parse_overrides(&json!({"a@x.com": -2})).is_err());
        assert!(parse_overrides(&json!({"a@x.com": 1.5})).is_err());
        assert!(parse_overrides(&json!([1, 2])).is_err());
    }
}
