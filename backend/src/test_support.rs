//! Test doubles shared by unit and integration tests.
//!
//! Compiled only with the `test-support` feature, which the crate enables
//! for its own dev builds.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{
    ChannelRepository, ChannelRepositoryError, LedgerRepository, LedgerRepositoryError, Notifier,
    NotifierError,
};
use crate::domain::{Channel, ChannelId, Expenditure, LedgerPartition, MessageTs, UsageReport};
use crate::inbound::http::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, signature_for};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A reply captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedReply {
    /// A usage report for a recorded or retracted expenditure.
    Usage {
        channel: ChannelId,
        report: UsageReport,
    },
    /// A plain-text failure notice.
    Failure { channel: ChannelId, message: String },
}

/// Notifier that remembers every reply and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    replies: Mutex<Vec<RecordedReply>>,
    failure: Mutex<Option<NotifierError>>,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail with `error`.
    pub fn fail_with(&self, error: NotifierError) {
        *lock(&self.failure) = Some(error);
    }

    /// Replies delivered so far, oldest first.
    pub fn replies(&self) -> Vec<RecordedReply> {
        lock(&self.replies).clone()
    }

    /// The most recent usage report, if any.
    pub fn last_report(&self) -> Option<UsageReport> {
        lock(&self.replies).iter().rev().find_map(|reply| match reply {
            RecordedReply::Usage { report, .. } => Some(*report),
            RecordedReply::Failure { .. } => None,
        })
    }

    fn deliver(&self, reply: RecordedReply) -> Result<(), NotifierError> {
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        lock(&self.replies).push(reply);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_usage(
        &self,
        channel: &ChannelId,
        report: &UsageReport,
    ) -> Result<(), NotifierError> {
        self.deliver(RecordedReply::Usage {
            channel: channel.clone(),
            report: *report,
        })
    }

    async fn notify_failure(
        &self,
        channel: &ChannelId,
        message: &str,
    ) -> Result<(), NotifierError> {
        self.deliver(RecordedReply::Failure {
            channel: channel.clone(),
            message: message.to_owned(),
        })
    }
}

/// Channel repository whose every call fails with a connection error.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableChannelRepository;

#[async_trait]
impl ChannelRepository for UnavailableChannelRepository {
    async fn find(&self, _id: &ChannelId) -> Result<Channel, ChannelRepositoryError> {
        Err(ChannelRepositoryError::connection("database is down"))
    }

    async fn save(&self, _channel: &Channel) -> Result<(), ChannelRepositoryError> {
        Err(ChannelRepositoryError::connection("database is down"))
    }
}

/// Ledger repository whose every call fails with a connection error.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableLedgerRepository;

#[async_trait]
impl LedgerRepository for UnavailableLedgerRepository {
    async fn add(&self, _expenditure: &Expenditure) -> Result<(), LedgerRepositoryError> {
        Err(LedgerRepositoryError::connection("database is down"))
    }

    async fn remove(
        &self,
        _channel: &ChannelId,
        _key: &MessageTs,
        _occurred_at: DateTime<Utc>,
    ) -> Result<(), LedgerRepositoryError> {
        Err(LedgerRepositoryError::connection("database is down"))
    }

    async fn sum(&self, _partition: &LedgerPartition) -> Result<i64, LedgerRepositoryError> {
        Err(LedgerRepositoryError::connection("database is down"))
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<chrono::Local> {
        self.0.with_timezone(&chrono::Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl FixedClock {
    /// Share the clock as a trait object.
    pub fn shared(self) -> Arc<dyn Clock> {
        Arc::new(self)
    }
}

/// Header pairs Slack would attach to `body` when signed with `secret` at
/// `timestamp`.
///
/// # Panics
///
/// Panics if HMAC rejects the key, which cannot happen for SHA-256.
pub fn slack_signature_headers(
    secret: &str,
    timestamp: i64,
    body: &str,
) -> [(&'static str, String); 2] {
    let timestamp = timestamp.to_string();
    let signature = signature_for(secret, &timestamp, body.as_bytes())
        .unwrap_or_else(|err| panic!("HMAC accepts any key length: {err}"));
    [(TIMESTAMP_HEADER, timestamp), (SIGNATURE_HEADER, signature)]
}
