//! Classification of inbound chat events into ledger intents.
//!
//! Every inbound event is classified exactly once, here, into an
//! [`Interpretation`]. Downstream code matches on the variant and never
//! re-inspects the raw event. Parse failures are not errors: they resolve to
//! [`Interpretation::Ignored`], optionally carrying a notice to show the user.

use super::{BudgetMutation, ChannelId, Expenditure, MessageTs, Retraction};

/// Subtype marker of a message-shaped event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSubtype {
    /// A freshly posted message.
    New,
    /// A deletion notice referencing a previously posted message.
    Deleted,
    /// Any other subtype (edits, bot posts, joins). Carries the raw marker
    /// for logging.
    Unsupported(String),
}

/// Transport-neutral view of a message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Channel the message was posted in.
    pub channel: String,
    /// Message text; empty for deletion notices.
    pub message_body: String,
    /// Timestamp token of the event itself.
    pub message_ts: String,
    /// New, deleted or unsupported.
    pub subtype: MessageSubtype,
    /// Text of the message a deletion notice refers to.
    pub previous_message_body: Option<String>,
    /// Timestamp token of the message a deletion notice refers to.
    pub previous_message_ts: Option<String>,
}

impl MessageEvent {
    /// A plain new-message event.
    pub fn new_message(
        channel: impl Into<String>,
        message_body: impl Into<String>,
        message_ts: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            message_body: message_body.into(),
            message_ts: message_ts.into(),
            subtype: MessageSubtype::New,
            previous_message_body: None,
            previous_message_ts: None,
        }
    }

    /// A deletion notice for the message posted at `previous_ts`.
    pub fn deleted_message(
        channel: impl Into<String>,
        previous_body: impl Into<String>,
        previous_ts: impl Into<String>,
    ) -> Self {
        let previous_ts = previous_ts.into();
        Self {
            channel: channel.into(),
            message_body: String::new(),
            message_ts: previous_ts.clone(),
            subtype: MessageSubtype::Deleted,
            previous_message_body: Some(previous_body.into()),
            previous_message_ts: Some(previous_ts),
        }
    }
}

/// A configuration command addressed to a channel, e.g. `set 1000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEvent {
    /// Channel the command was run in.
    pub channel: String,
    /// Everything after the command name.
    pub text: String,
}

/// Any event the interpreter accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A channel message or deletion notice.
    Message(MessageEvent),
    /// A slash-command invocation.
    Command(CommandEvent),
}

/// Reasons a configuration command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandRejection {
    /// Not exactly `set <integer>`.
    InvalidFormat,
    /// The budget token is not a base-10 64-bit integer.
    NonIntegerBudget,
    /// The budget parsed but is below zero.
    NegativeBudget,
}

impl CommandRejection {
    /// Reply shown to the user who issued the command.
    pub fn user_notice(self) -> &'static str {
        match self {
            Self::InvalidFormat => "Invalid command format. Usage: `/moneysaver set 1000`",
            Self::NonIntegerBudget => "Budget must be an integer.",
            Self::NegativeBudget => "Budget must not be negative.",
        }
    }
}

/// Why an event produced no ledger intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The message body is not a bare integer.
    NotAnAmount,
    /// The deletion notice lacked the original message or its body is not
    /// an integer.
    NotARetraction,
    /// Edits and other subtypes are not recognised.
    UnsupportedSubtype(String),
    /// The channel identifier failed validation.
    InvalidChannel,
    /// The message timestamp token failed validation.
    InvalidTimestamp,
    /// A malformed configuration command.
    RejectedCommand(CommandRejection),
}

impl IgnoreReason {
    /// Notice to show the user, if this drop is user-visible.
    ///
    /// Only malformed commands are reported; ignored messages are silent.
    pub fn user_notice(&self) -> Option<&'static str> {
        match self {
            Self::RejectedCommand(rejection) => Some(rejection.user_notice()),
            _ => None,
        }
    }
}

/// The single classification of an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// Record a new expenditure.
    Expenditure(Expenditure),
    /// Remove the expenditure of a deleted message.
    Retraction(Retraction),
    /// Overwrite the channel's budget.
    ConfigMutation(BudgetMutation),
    /// No ledger effect.
    Ignored(IgnoreReason),
}

/// Parse a message body as a base-10 signed 64-bit amount.
///
/// Surrounding whitespace and trailing characters are rejected rather than
/// trimmed or truncated. A leading `+` or `-` is accepted.
///
/// # Examples
/// ```
/// use moneysaver::domain::parse_amount;
///
/// assert_eq!(parse_amount("-300"), Some(-300));
/// assert_eq!(parse_amount("300yen"), None);
/// assert_eq!(parse_amount(" 300"), None);
/// ```
pub fn parse_amount(body: &str) -> Option<i64> {
    body.parse::<i64>().ok()
}

/// Classify an inbound event.
pub fn interpret(event: &InboundEvent) -> Interpretation {
    match event {
        InboundEvent::Message(message) => interpret_message(message),
        InboundEvent::Command(command) => interpret_command(command),
    }
}

fn interpret_message(event: &MessageEvent) -> Interpretation {
    let Ok(channel) = ChannelId::new(event.channel.as_str()) else {
        return Interpretation::Ignored(IgnoreReason::InvalidChannel);
    };

    match &event.subtype {
        MessageSubtype::New => {
            let Some(amount) = parse_amount(&event.message_body) else {
                return Interpretation::Ignored(IgnoreReason::NotAnAmount);
            };
            match MessageTs::new(event.message_ts.as_str()) {
                Ok(key) => Interpretation::Expenditure(Expenditure::new(channel, key, amount)),
                Err(_) => Interpretation::Ignored(IgnoreReason::InvalidTimestamp),
            }
        }
        MessageSubtype::Deleted => {
            let (Some(body), Some(ts)) = (
                event.previous_message_body.as_deref(),
                event.previous_message_ts.as_deref(),
            ) else {
                return Interpretation::Ignored(IgnoreReason::NotARetraction);
            };
            let Some(amount) = parse_amount(body) else {
                return Interpretation::Ignored(IgnoreReason::NotARetraction);
            };
            match MessageTs::new(ts) {
                Ok(key) => Interpretation::Retraction(Retraction::new(channel, key, amount)),
                Err(_) => Interpretation::Ignored(IgnoreReason::InvalidTimestamp),
            }
        }
        MessageSubtype::Unsupported(marker) => {
            Interpretation::Ignored(IgnoreReason::UnsupportedSubtype(marker.clone()))
        }
    }
}

fn interpret_command(event: &CommandEvent) -> Interpretation {
    let reject = |rejection| Interpretation::Ignored(IgnoreReason::RejectedCommand(rejection));

    let tokens: Vec<&str> = event.text.split_whitespace().collect();
    let [verb, budget] = tokens.as_slice() else {
        return reject(CommandRejection::InvalidFormat);
    };
    if *verb != "set" {
        return reject(CommandRejection::InvalidFormat);
    }
    let Some(budget) = parse_amount(budget) else {
        return reject(CommandRejection::NonIntegerBudget);
    };
    if budget < 0 {
        return reject(CommandRejection::NegativeBudget);
    }
    let Ok(channel) = ChannelId::new(event.channel.as_str()) else {
        return Interpretation::Ignored(IgnoreReason::InvalidChannel);
    };

    Interpretation::ConfigMutation(BudgetMutation { channel, budget })
}
