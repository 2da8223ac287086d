//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Monthly budget per Slack channel.
    ///
    /// One row per configured channel; a missing row means the channel has
    /// no budget and its messages are not recorded.
    channels (id) {
        /// Slack channel identifier.
        id -> Text,
        /// Monthly spending limit in whole yen (never negative).
        budget -> Int8,
        /// Last time the budget was overwritten.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Expenditure records partitioned by channel and UTC month.
    ///
    /// The composite primary key makes redelivered messages overwrite the
    /// same row instead of double counting.
    expenditures (channel_id, month, message_ts) {
        /// Slack channel identifier.
        channel_id -> Text,
        /// Partition month as `YYYY-MM`.
        month -> Text,
        /// Slack message timestamp, used as the idempotency key.
        message_ts -> Text,
        /// Amount in whole yen.
        amount -> Int8,
        /// Instant derived from the message timestamp.
        occurred_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(channels, expenditures);
