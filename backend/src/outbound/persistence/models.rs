//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{channels, expenditures};

/// Row struct for reading from the channels table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = channels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChannelRow {
    pub id: String,
    pub budget: i64,
    #[expect(dead_code, reason = "audit column is written but never read back")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating or overwriting channel records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = channels)]
pub(crate) struct NewChannelRow<'a> {
    pub id: &'a str,
    pub budget: i64,
}

/// Insertable struct for expenditure records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expenditures)]
pub(crate) struct NewExpenditureRow<'a> {
    pub channel_id: &'a str,
    pub month: String,
    pub message_ts: &'a str,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}
