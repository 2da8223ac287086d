//! Ledger domain service.
//!
//! Implements the [`LedgerCommand`] driving port: each inbound event is
//! classified once, applied to the channel or ledger repository, summed over
//! its partition and reported through the notifier.
//!
//! No locks are held across the add, sum and reply steps. A concurrent
//! sibling mutation may or may not be reflected in the reported total.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    ChannelRepository, ChannelRepositoryError, DropReason, EventOutcome, LedgerCommand,
    LedgerRepository, LedgerRepositoryError, Notifier, NotifierError,
};
use crate::domain::{
    Channel, ChannelId, Error, Expenditure, InboundEvent, Interpretation, LedgerPartition,
    Retraction, UsageKind, UsageReport, interpret,
};

/// Ledger service implementing the driving port.
///
/// Collaborators may be concrete adapters or trait objects chosen at start-up.
pub struct LedgerService<C: ?Sized, L: ?Sized, N: ?Sized> {
    channels: Arc<C>,
    ledger: Arc<L>,
    notifier: Arc<N>,
}

impl<C: ?Sized, L: ?Sized, N: ?Sized> Clone for LedgerService<C, L, N> {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
            ledger: Arc::clone(&self.ledger),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<C: ?Sized, L: ?Sized, N: ?Sized> LedgerService<C, L, N> {
    /// Create a new service with the given collaborators.
    pub fn new(channels: Arc<C>, ledger: Arc<L>, notifier: Arc<N>) -> Self {
        Self {
            channels,
            ledger,
            notifier,
        }
    }
}

impl<C, L, N> LedgerService<C, L, N>
where
    C: ChannelRepository + ?Sized,
    L: LedgerRepository + ?Sized,
    N: Notifier + ?Sized,
{
    fn map_channel_error(error: ChannelRepositoryError) -> Error {
        match error {
            ChannelRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("channel repository unavailable: {message}"))
            }
            ChannelRepositoryError::Query { message } => {
                Error::internal(format!("channel repository error: {message}"))
            }
            ChannelRepositoryError::NotFound { channel_id } => {
                Error::not_found(format!("channel {channel_id} has no budget configured"))
            }
        }
    }

    fn map_ledger_error(error: LedgerRepositoryError) -> Error {
        match error {
            LedgerRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("ledger repository unavailable: {message}"))
            }
            LedgerRepositoryError::Query { message } => {
                Error::internal(format!("ledger repository error: {message}"))
            }
            LedgerRepositoryError::Overflow { partition } => {
                Error::internal(format!("ledger total overflowed for {partition}"))
            }
        }
    }

    fn map_notifier_error(error: NotifierError) -> Error {
        Error::service_unavailable(format!("reply could not be delivered: {error}"))
    }

    /// Best-effort failure notice. The original error is always returned;
    /// a failure to deliver the notice is only logged.
    async fn fail(&self, channel: &ChannelId, error: Error) -> Error {
        error!(channel = %channel, code = ?error.code(), "ledger event failed: {error}");
        if let Err(notify_error) = self.notifier.notify_failure(channel, error.message()).await {
            warn!(channel = %channel, "failed to deliver failure notice: {notify_error}");
        }
        error
    }

    /// Look up the channel budget, or `None` if it is unconfigured.
    async fn configured_channel(&self, id: &ChannelId) -> Result<Option<Channel>, Error> {
        match self.channels.find(id).await {
            Ok(channel) => Ok(Some(channel)),
            Err(ChannelRepositoryError::NotFound { .. }) => Ok(None),
            Err(err) => Err(self.fail(id, Self::map_channel_error(err)).await),
        }
    }

    async fn partition_total(
        &self,
        channel: &ChannelId,
        partition: &LedgerPartition,
    ) -> Result<i64, Error> {
        match self.ledger.sum(partition).await {
            Ok(total) => Ok(total),
            Err(err) => Err(self.fail(channel, Self::map_ledger_error(err)).await),
        }
    }

    async fn report(
        &self,
        channel: &Channel,
        kind: UsageKind,
        usage: i64,
        partition: &LedgerPartition,
    ) -> Result<UsageReport, Error> {
        let total = self.partition_total(channel.id(), partition).await?;
        let Some(report) = UsageReport::new(kind, usage, total, channel.budget()) else {
            let err = Error::internal(format!("remaining budget overflowed for {partition}"));
            return Err(self.fail(channel.id(), err).await);
        };

        self.notifier
            .notify_usage(channel.id(), &report)
            .await
            .map_err(Self::map_notifier_error)?;
        Ok(report)
    }

    async fn record(&self, expenditure: Expenditure) -> Result<EventOutcome, Error> {
        let Some(channel) = self.configured_channel(expenditure.channel()).await? else {
            return Ok(Self::unconfigured(expenditure.channel()));
        };

        let partition = expenditure.partition();
        if let Err(err) = self.ledger.add(&expenditure).await {
            return Err(self.fail(channel.id(), Self::map_ledger_error(err)).await);
        }
        info!(
            partition = %partition,
            message_ts = %expenditure.idempotency_key(),
            amount = expenditure.amount(),
            "expenditure recorded"
        );

        let report = self
            .report(&channel, UsageKind::Recorded, expenditure.amount(), &partition)
            .await?;
        Ok(EventOutcome::Recorded(report))
    }

    async fn retract(&self, retraction: Retraction) -> Result<EventOutcome, Error> {
        let Some(channel) = self.configured_channel(retraction.channel()).await? else {
            return Ok(Self::unconfigured(retraction.channel()));
        };

        let partition = retraction.partition();
        if let Err(err) = self
            .ledger
            .remove(
                retraction.channel(),
                retraction.idempotency_key(),
                retraction.occurred_at(),
            )
            .await
        {
            return Err(self.fail(channel.id(), Self::map_ledger_error(err)).await);
        }
        info!(
            partition = %partition,
            message_ts = %retraction.idempotency_key(),
            "expenditure retracted"
        );

        let report = self
            .report(&channel, UsageKind::Retracted, retraction.amount(), &partition)
            .await?;
        Ok(EventOutcome::Retracted(report))
    }

    async fn set_budget(&self, channel: Channel) -> Result<EventOutcome, Error> {
        self.channels
            .save(&channel)
            .await
            .map_err(Self::map_channel_error)?;
        info!(channel = %channel.id(), budget = channel.budget(), "budget updated");
        Ok(EventOutcome::BudgetSet {
            channel: channel.id().clone(),
            budget: channel.budget(),
        })
    }

    fn unconfigured(channel: &ChannelId) -> EventOutcome {
        debug!(channel = %channel, "dropping event for unconfigured channel");
        EventOutcome::Dropped(DropReason::UnconfiguredChannel(channel.clone()))
    }
}

#[async_trait]
impl<C, L, N> LedgerCommand for LedgerService<C, L, N>
where
    C: ChannelRepository + ?Sized,
    L: LedgerRepository + ?Sized,
    N: Notifier + ?Sized,
{
    async fn handle(&self, event: InboundEvent) -> Result<EventOutcome, Error> {
        match interpret(&event) {
            Interpretation::Expenditure(expenditure) => self.record(expenditure).await,
            Interpretation::Retraction(retraction) => self.retract(retraction).await,
            Interpretation::ConfigMutation(mutation) => {
                let channel = Channel::try_from(mutation)
                    .map_err(|err| Error::invalid_request(err.to_string()))?;
                self.set_budget(channel).await
            }
            Interpretation::Ignored(reason) => {
                debug!(?reason, "ignoring inbound event");
                Ok(EventOutcome::Dropped(DropReason::Ignored(reason)))
            }
        }
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
