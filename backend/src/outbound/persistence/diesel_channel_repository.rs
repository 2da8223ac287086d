//! PostgreSQL-backed `ChannelRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ChannelRepository, ChannelRepositoryError};
use crate::domain::{Channel, ChannelId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ChannelRow, NewChannelRow};
use super::pool::DbPool;
use super::schema::channels;

/// Diesel-backed implementation of the `ChannelRepository` port.
///
/// `save` is an upsert on the channel id, so repeated `set` commands simply
/// overwrite the stored budget.
#[derive(Clone)]
pub struct DieselChannelRepository {
    pool: DbPool,
}

impl DieselChannelRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_channel(row: ChannelRow) -> Result<Channel, ChannelRepositoryError> {
    let id = ChannelId::new(row.id).map_err(|err| {
        warn!(error = %err, "stored channel id failed validation");
        ChannelRepositoryError::query(format!("stored channel is invalid: {err}"))
    })?;
    Channel::new(id, row.budget)
        .map_err(|err| ChannelRepositoryError::query(format!("stored channel is invalid: {err}")))
}

#[async_trait]
impl ChannelRepository for DieselChannelRepository {
    async fn find(&self, id: &ChannelId) -> Result<Channel, ChannelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ChannelRow> = channels::table
            .filter(channels::id.eq(id.as_str()))
            .select(ChannelRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        match row {
            Some(row) => row_to_channel(row),
            None => Err(ChannelRepositoryError::not_found(id.as_str())),
        }
    }

    async fn save(&self, channel: &Channel) -> Result<(), ChannelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewChannelRow {
            id: channel.id().as_str(),
            budget: channel.budget(),
        };

        diesel::insert_into(channels::table)
            .values(&row)
            .on_conflict(channels::id)
            .do_update()
            .set((
                channels::budget.eq(excluded(channels::budget)),
                channels::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
