//! PostgreSQL-backed `LedgerRepository` implementation using Diesel ORM.
//!
//! Every record lives under the composite key `(channel_id, month,
//! message_ts)`. `add` upserts on that key and `remove` deletes by it, so
//! both are idempotent without any locking in the service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LedgerRepository, LedgerRepositoryError};
use crate::domain::{ChannelId, Expenditure, LedgerMonth, LedgerPartition, MessageTs};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewExpenditureRow;
use super::pool::DbPool;
use super::schema::expenditures;

/// Diesel-backed implementation of the `LedgerRepository` port.
#[derive(Clone)]
pub struct DieselLedgerRepository {
    pool: DbPool,
}

impl DieselLedgerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Add amounts without wrapping; `None` when the total leaves `i64`.
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = i64>) -> Option<i64> {
    amounts
        .into_iter()
        .try_fold(0_i64, |total, amount| total.checked_add(amount))
}

#[async_trait]
impl LedgerRepository for DieselLedgerRepository {
    async fn add(&self, expenditure: &Expenditure) -> Result<(), LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewExpenditureRow {
            channel_id: expenditure.channel().as_str(),
            month: expenditure.partition().month.to_string(),
            message_ts: expenditure.idempotency_key().as_str(),
            amount: expenditure.amount(),
            occurred_at: expenditure.occurred_at(),
        };

        diesel::insert_into(expenditures::table)
            .values(&row)
            .on_conflict((
                expenditures::channel_id,
                expenditures::month,
                expenditures::message_ts,
            ))
            .do_update()
            .set((
                expenditures::amount.eq(excluded(expenditures::amount)),
                expenditures::occurred_at.eq(excluded(expenditures::occurred_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn remove(
        &self,
        channel: &ChannelId,
        key: &MessageTs,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let month = LedgerMonth::containing(occurred_at).to_string();

        diesel::delete(
            expenditures::table
                .filter(expenditures::channel_id.eq(channel.as_str()))
                .filter(expenditures::month.eq(month))
                .filter(expenditures::message_ts.eq(key.as_str())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn sum(&self, partition: &LedgerPartition) -> Result<i64, LedgerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Summed in process: SUM(BIGINT) widens to NUMERIC in PostgreSQL and
        // overflow must surface as an error rather than a wrapped value.
        let amounts: Vec<i64> = expenditures::table
            .filter(expenditures::channel_id.eq(partition.channel.as_str()))
            .filter(expenditures::month.eq(partition.month.to_string()))
            .select(expenditures::amount)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        checked_total(amounts).ok_or_else(|| LedgerRepositoryError::overflow(partition.to_string()))
    }
}
