//! Port abstraction for the partitioned expenditure ledger.
//!
//! Records are keyed by `(channel, month, message timestamp)`. Adapters must
//! make `add` an idempotent upsert and `remove` an idempotent delete at the
//! storage layer, since redelivered and concurrent events are expected and
//! no in-process locking is applied.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ChannelId, Expenditure, LedgerPartition, MessageTs};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ledger repository adapters.
    pub enum LedgerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ledger repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ledger repository query failed: {message}",
        /// The partition total does not fit in a signed 64-bit integer.
        Overflow { partition: String } => "ledger total overflowed for {partition}",
    }
}

/// Port for expenditure record storage and aggregation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Insert the record, or overwrite the record with the same key in the
    /// same partition (last write wins).
    async fn add(&self, expenditure: &Expenditure) -> Result<(), LedgerRepositoryError>;

    /// Delete the record keyed by `key` in the partition containing
    /// `occurred_at`. Removing an absent record succeeds.
    async fn remove(
        &self,
        channel: &ChannelId,
        key: &MessageTs,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), LedgerRepositoryError>;

    /// Sum of all amounts in the partition; zero when it is empty.
    async fn sum(&self, partition: &LedgerPartition) -> Result<i64, LedgerRepositoryError>;
}

/// Fixture implementation for testing without a real database.
///
/// Discards mutations and reports every partition as empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerRepository;

#[async_trait]
impl LedgerRepository for FixtureLedgerRepository {
    async fn add(&self, _expenditure: &Expenditure) -> Result<(), LedgerRepositoryError> {
        Ok(())
    }

    async fn remove(
        &self,
        _channel: &ChannelId,
        _key: &MessageTs,
        _occurred_at: DateTime<Utc>,
    ) -> Result<(), LedgerRepositoryError> {
        Ok(())
    }

    async fn sum(&self, _partition: &LedgerPartition) -> Result<i64, LedgerRepositoryError> {
        Ok(0)
    }
}
