//! Driving port for inbound ledger events.
//!
//! Inbound adapters translate their wire format into an [`InboundEvent`] and
//! hand it to [`LedgerCommand::handle`]. The returned [`EventOutcome`] tells
//! the adapter what happened so it can shape its own response; replies into
//! the channel have already been sent by the time it returns.

use async_trait::async_trait;

use crate::domain::{ChannelId, Error, IgnoreReason, InboundEvent, UsageReport};

/// Why an event terminated without a ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The interpreter could not classify the event.
    Ignored(IgnoreReason),
    /// The channel has no budget configured.
    UnconfiguredChannel(ChannelId),
}

/// Terminal state of one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// An expenditure was stored and the usage reply delivered.
    Recorded(UsageReport),
    /// An expenditure was removed and the usage reply delivered.
    Retracted(UsageReport),
    /// The channel budget was overwritten.
    BudgetSet { channel: ChannelId, budget: i64 },
    /// Nothing was stored and nothing was replied.
    Dropped(DropReason),
}

impl EventOutcome {
    /// Notice the inbound adapter should show the user, if any.
    pub fn user_notice(&self) -> Option<&'static str> {
        match self {
            Self::Dropped(DropReason::Ignored(reason)) => reason.user_notice(),
            _ => None,
        }
    }
}

/// Driving port for ledger events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerCommand: Send + Sync {
    /// Classify the event and apply its effect.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage call fails or the usage reply could not
    /// be delivered. In the storage case a failure notice has already been
    /// attempted.
    async fn handle(&self, event: InboundEvent) -> Result<EventOutcome, Error>;
}

/// Fixture implementation that drops every event unseen.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLedgerCommand;

#[async_trait]
impl LedgerCommand for FixtureLedgerCommand {
    async fn handle(&self, _event: InboundEvent) -> Result<EventOutcome, Error> {
        Ok(EventOutcome::Dropped(DropReason::Ignored(
            IgnoreReason::NotAnAmount,
        )))
    }
}
