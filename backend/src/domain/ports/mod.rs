//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod channel_repository;
mod ledger_command;
mod ledger_repository;
mod notifier;

#[cfg(test)]
pub use channel_repository::MockChannelRepository;
pub use channel_repository::{ChannelRepository, ChannelRepositoryError, FixtureChannelRepository};
#[cfg(test)]
pub use ledger_command::MockLedgerCommand;
pub use ledger_command::{DropReason, EventOutcome, FixtureLedgerCommand, LedgerCommand};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{FixtureLedgerRepository, LedgerRepository, LedgerRepositoryError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{FixtureNotifier, Notifier, NotifierError};
