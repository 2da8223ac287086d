//! Notifier used when no Slack bot token is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notifier, NotifierError};
use crate::domain::{ChannelId, UsageReport};

use super::format::format_yen;

/// Writes replies to the log instead of posting them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn notify_usage(
        &self,
        channel: &ChannelId,
        report: &UsageReport,
    ) -> Result<(), NotifierError> {
        info!(
            %channel,
            kind = ?report.kind(),
            usage = %format_yen(report.usage()),
            remaining = %format_yen(report.remaining()),
            total = %format_yen(report.total()),
            limit = %format_yen(report.limit()),
            "usage reply (not posted)"
        );
        Ok(())
    }

    async fn notify_failure(
        &self,
        channel: &ChannelId,
        message: &str,
    ) -> Result<(), NotifierError> {
        info!(%channel, message, "failure notice (not posted)");
        Ok(())
    }
}
