//! Port abstraction for per-channel budget configuration.
//!
//! The [`ChannelRepository`] owns [`Channel`] records exclusively. A missing
//! record is reported as [`ChannelRepositoryError::NotFound`], which callers
//! treat as "no budget configured" rather than as a failure.

use async_trait::async_trait;

use crate::domain::{Channel, ChannelId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by channel repository adapters.
    pub enum ChannelRepositoryError {
        /// No budget has been configured for the channel.
        NotFound { channel_id: String } => "channel {channel_id} has no budget configured",
        /// Repository connection could not be established.
        Connection { message: String } => "channel repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "channel repository query failed: {message}",
    }
}

/// Port for channel configuration storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Load the configuration for `id`.
    ///
    /// Returns [`ChannelRepositoryError::NotFound`] when the channel has
    /// never been configured.
    async fn find(&self, id: &ChannelId) -> Result<Channel, ChannelRepositoryError>;

    /// Create or fully overwrite the channel's configuration.
    async fn save(&self, channel: &Channel) -> Result<(), ChannelRepositoryError>;
}

/// Fixture implementation for testing without a real database.
///
/// Reports every channel as unconfigured and discards saves.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureChannelRepository;

#[async_trait]
impl ChannelRepository for FixtureChannelRepository {
    async fn find(&self, id: &ChannelId) -> Result<Channel, ChannelRepositoryError> {
        Err(ChannelRepositoryError::not_found(id.as_str()))
    }

    async fn save(&self, _channel: &Channel) -> Result<(), ChannelRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_reports_channels_as_unconfigured() {
        let repo = FixtureChannelRepository;
        let id = ChannelId::new("C1").expect("valid id");

        let err = repo.find(&id).await.expect_err("fixture has no channels");

        assert_eq!(err, ChannelRepositoryError::not_found("C1"));
        assert_eq!(err.to_string(), "channel C1 has no budget configured");
    }

    #[tokio::test]
    async fn fixture_accepts_saves() {
        let repo = FixtureChannelRepository;
        let channel = Channel::new(ChannelId::new("C1").expect("valid id"), 100).expect("channel");

        repo.save(&channel).await.expect("fixture save succeeds");
    }
}
