//! Port abstraction for delivering replies to a channel.
//!
//! The domain only decides which values a reply contains; headline text,
//! field labels and currency formatting belong to the adapter.

use async_trait::async_trait;

use crate::domain::{ChannelId, UsageReport};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum NotifierError {
        /// The request could not be sent or timed out.
        Transport { message: String } => "notifier transport failed: {message}",
        /// The chat platform refused the message.
        Rejected { message: String } => "notifier request rejected: {message}",
        /// The chat platform's response could not be decoded.
        Decode { message: String } => "notifier response could not be decoded: {message}",
    }
}

/// Port for posting replies into a channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post the result of a recorded or retracted expenditure.
    async fn notify_usage(
        &self,
        channel: &ChannelId,
        report: &UsageReport,
    ) -> Result<(), NotifierError>;

    /// Post a plain-text failure notice.
    async fn notify_failure(&self, channel: &ChannelId, message: &str)
    -> Result<(), NotifierError>;
}

/// Fixture implementation that accepts and drops every reply.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn notify_usage(
        &self,
        _channel: &ChannelId,
        _report: &UsageReport,
    ) -> Result<(), NotifierError> {
        Ok(())
    }

    async fn notify_failure(
        &self,
        _channel: &ChannelId,
        _message: &str,
    ) -> Result<(), NotifierError> {
        Ok(())
    }
}
