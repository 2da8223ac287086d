//! Channel identity and per-channel budget configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`ChannelId::new`] and [`Channel::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelValidationError {
    /// The identifier was blank.
    EmptyId,
    /// The identifier contains whitespace.
    InvalidId,
    /// Budgets start at zero.
    NegativeBudget { budget: i64 },
}

impl fmt::Display for ChannelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "channel id must not be empty"),
            Self::InvalidId => write!(f, "channel id must not contain whitespace"),
            Self::NegativeBudget { budget } => {
                write!(f, "budget must not be negative (got {budget})")
            }
        }
    }
}

impl std::error::Error for ChannelValidationError {}

/// Chat platform channel identifier (for Slack, values such as `C024BE91L`).
///
/// The identifier is opaque; it is only checked for emptiness and embedded
/// whitespace so it can be used verbatim as a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Validate and construct a [`ChannelId`].
    pub fn new(id: impl Into<String>) -> Result<Self, ChannelValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ChannelValidationError::EmptyId);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(ChannelValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ChannelId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ChannelId> for String {
    fn from(value: ChannelId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ChannelId {
    type Error = ChannelValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A channel with a configured monthly budget.
///
/// ## Invariants
/// - `budget >= 0`, in the smallest currency unit.
///
/// Channels are only created or overwritten by an explicit `set` command;
/// expenditure events never create one.
///
/// # Examples
/// ```
/// use moneysaver::domain::{Channel, ChannelId};
///
/// let id = ChannelId::new("C024BE91L").expect("valid id");
/// let channel = Channel::new(id, 30_000).expect("non-negative budget");
/// assert_eq!(channel.budget(), 30_000);
/// assert!(Channel::new(channel.id().clone(), -1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    id: ChannelId,
    budget: i64,
}

impl Channel {
    /// Validate and construct a channel configuration.
    pub fn new(id: ChannelId, budget: i64) -> Result<Self, ChannelValidationError> {
        if budget < 0 {
            return Err(ChannelValidationError::NegativeBudget { budget });
        }
        Ok(Self { id, budget })
    }

    /// Channel identifier.
    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// Monthly spending ceiling.
    pub fn budget(&self) -> i64 {
        self.budget
    }
}

/// Request to overwrite a channel's budget, produced by a `set` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetMutation {
    /// Channel being configured.
    pub channel: ChannelId,
    /// New monthly budget.
    pub budget: i64,
}

impl TryFrom<BudgetMutation> for Channel {
    type Error = ChannelValidationError;

    fn try_from(value: BudgetMutation) -> Result<Self, Self::Error> {
        Channel::new(value.channel, value.budget)
    }
}
