//! In-process adapters for the channel and ledger repositories.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. State lives behind a `Mutex` and is lost on restart; the keying,
//! overwrite and overflow semantics match the PostgreSQL adapters.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    ChannelRepository, ChannelRepositoryError, LedgerRepository, LedgerRepositoryError,
};
use crate::domain::{Channel, ChannelId, Expenditure, LedgerPartition, MessageTs};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Channel budgets held in memory.
#[derive(Debug, Default)]
pub struct InMemoryChannelRepository {
    store: Mutex<HashMap<ChannelId, Channel>>,
}

impl InMemoryChannelRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn find(&self, id: &ChannelId) -> Result<Channel, ChannelRepositoryError> {
        lock(&self.store)
            .get(id)
            .cloned()
            .ok_or_else(|| ChannelRepositoryError::not_found(id.as_str()))
    }

    async fn save(&self, channel: &Channel) -> Result<(), ChannelRepositoryError> {
        lock(&self.store).insert(channel.id().clone(), channel.clone());
        Ok(())
    }
}

/// Expenditure records held in memory, grouped by partition.
#[derive(Debug, Default)]
pub struct InMemoryLedgerRepository {
    partitions: Mutex<HashMap<LedgerPartition, BTreeMap<MessageTs, i64>>>,
}

impl InMemoryLedgerRepository {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored in `partition`.
    pub fn record_count(&self, partition: &LedgerPartition) -> usize {
        lock(&self.partitions).get(partition).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn add(&self, expenditure: &Expenditure) -> Result<(), LedgerRepositoryError> {
        lock(&self.partitions)
            .entry(expenditure.partition())
            .or_default()
            .insert(expenditure.idempotency_key().clone(), expenditure.amount());
        Ok(())
    }

    async fn remove(
        &self,
        channel: &ChannelId,
        key: &MessageTs,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), LedgerRepositoryError> {
        let partition = LedgerPartition::new(channel.clone(), occurred_at);
        let mut partitions = lock(&self.partitions);
        if let Some(records) = partitions.get_mut(&partition) {
            records.remove(key);
            if records.is_empty() {
                partitions.remove(&partition);
            }
        }
        Ok(())
    }

    async fn sum(&self, partition: &LedgerPartition) -> Result<i64, LedgerRepositoryError> {
        let partitions = lock(&self.partitions);
        let Some(records) = partitions.get(partition) else {
            return Ok(0);
        };
        records
            .values()
            .try_fold(0_i64, |total, amount| total.checked_add(*amount))
            .ok_or_else(|| LedgerRepositoryError::overflow(partition.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn channel() -> ChannelId {
        ChannelId::new("C1").expect("valid id")
    }

    fn ts(raw: &str) -> MessageTs {
        MessageTs::new(raw).expect("valid ts")
    }

    // 1704067200 is 2024-01-01T00:00:00Z.
    const JAN_FIRST: &str = "1704067200.000100";
    const JAN_LAST: &str = "1706745599.000200";
    const FEB_FIRST: &str = "1706745600.000300";

    #[rstest]
    #[tokio::test]
    async fn unknown_channel_is_not_found(channel: ChannelId) {
        let repo = InMemoryChannelRepository::new();

        let err = repo.find(&channel).await.expect_err("nothing saved yet");

        assert_eq!(err, ChannelRepositoryError::not_found("C1"));
    }

    #[rstest]
    #[tokio::test]
    async fn save_overwrites_the_budget(channel: ChannelId) {
        let repo = InMemoryChannelRepository::new();
        repo.save(&Channel::new(channel.clone(), 1_000).expect("channel"))
            .await
            .expect("first save");
        repo.save(&Channel::new(channel.clone(), 2_500).expect("channel"))
            .await
            .expect("second save");

        let stored = repo.find(&channel).await.expect("configured");

        assert_eq!(stored.budget(), 2_500);
    }

    #[rstest]
    #[tokio::test]
    async fn redelivered_record_is_counted_once(channel: ChannelId) {
        let repo = InMemoryLedgerRepository::new();
        let first = Expenditure::new(channel.clone(), ts(JAN_FIRST), 500);
        let replay = Expenditure::new(channel, ts(JAN_FIRST), 700);

        repo.add(&first).await.expect("add");
        repo.add(&replay).await.expect("replay");

        assert_eq!(repo.sum(&first.partition()).await.expect("sum"), 700);
        assert_eq!(repo.record_count(&first.partition()), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn months_are_summed_independently(channel: ChannelId) {
        let repo = InMemoryLedgerRepository::new();
        let january = Expenditure::new(channel.clone(), ts(JAN_LAST), 300);
        let february = Expenditure::new(channel.clone(), ts(FEB_FIRST), 40);
        repo.add(&january).await.expect("add january");
        repo.add(&february).await.expect("add february");

        assert_eq!(repo.sum(&january.partition()).await.expect("sum"), 300);
        assert_eq!(repo.sum(&february.partition()).await.expect("sum"), 40);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_is_idempotent(channel: ChannelId) {
        let repo = InMemoryLedgerRepository::new();
        let record = Expenditure::new(channel.clone(), ts(JAN_FIRST), 500);
        repo.add(&record).await.expect("add");

        for _ in 0..2 {
            repo.remove(&channel, record.idempotency_key(), record.occurred_at())
                .await
                .expect("remove");
        }

        assert_eq!(repo.sum(&record.partition()).await.expect("sum"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_only_touches_the_matching_month(channel: ChannelId) {
        let repo = InMemoryLedgerRepository::new();
        let january = Expenditure::new(channel.clone(), ts(JAN_FIRST), 500);
        repo.add(&january).await.expect("add");

        let february = ts(FEB_FIRST);
        repo.remove(&channel, january.idempotency_key(), february.occurred_at())
            .await
            .expect("remove in another month");

        assert_eq!(repo.sum(&january.partition()).await.expect("sum"), 500);
    }

    #[rstest]
    #[tokio::test]
    async fn overflowing_total_is_an_error(channel: ChannelId) {
        let repo = InMemoryLedgerRepository::new();
        let big = Expenditure::new(channel.clone(), ts(JAN_FIRST), i64::MAX);
        let one = Expenditure::new(channel, ts(JAN_LAST), 1);
        repo.add(&big).await.expect("add");
        repo.add(&one).await.expect("add");

        let err = repo.sum(&big.partition()).await.expect_err("overflow");

        assert_eq!(err, LedgerRepositoryError::overflow("C1/2024-01"));
    }
}
