//! Wire types for Slack's Events API and slash-command deliveries.
//!
//! Only the fields the ledger reads are modelled; Slack adds fields freely
//! and unknown ones are ignored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CommandEvent, InboundEvent, MessageEvent, MessageSubtype};

const MESSAGE_DELETED: &str = "message_deleted";

/// Outer Events API envelope, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint ownership check sent when the request URL is configured.
    UrlVerification { challenge: String },
    /// A subscribed event.
    EventCallback { event: SlackEvent },
    /// Rate-limit notices and envelope types the ledger does not consume.
    #[serde(other)]
    Unsupported,
}

/// Body returned for `url_verification`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChallengeResponse {
    /// The challenge Slack sent, echoed unchanged.
    pub challenge: String,
}

/// Snapshot of the message a deletion notice refers to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviousMessage {
    /// Text of the deleted message.
    #[serde(default)]
    pub text: Option<String>,
    /// Timestamp token of the deleted message.
    #[serde(default)]
    pub ts: Option<String>,
}

/// Inner event of an `event_callback` envelope, discriminated by `type`.
///
/// Only `message` bodies are decoded. Other event types reuse field names
/// with different shapes (`channel_created` carries `channel` as an object),
/// so they are matched by tag alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    /// A channel message, including edits and deletion notices.
    Message(MessagePayload),
    /// Any event type the ledger does not consume.
    #[serde(other)]
    Other,
}

/// Fields of a `message` event.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    /// Channel id.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Timestamp token of this event.
    #[serde(default)]
    pub ts: Option<String>,
    /// Absent for plain user messages.
    #[serde(default)]
    pub subtype: Option<String>,
    /// Set when an app or bot posted the message.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Timestamp token of the deleted message, on deletion notices.
    #[serde(default)]
    pub deleted_ts: Option<String>,
    /// The message as it was before deletion.
    #[serde(default)]
    pub previous_message: Option<PreviousMessage>,
}

impl SlackEvent {
    /// Map a channel message event onto the domain's inbound event.
    ///
    /// Returns `None` for event types other than `message` and for messages
    /// without a channel; those are acknowledged without effect.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        match self {
            Self::Message(message) => message.into_inbound(),
            Self::Other => None,
        }
    }
}

impl MessagePayload {
    fn into_inbound(self) -> Option<InboundEvent> {
        let channel = self.channel?;

        let subtype = match (self.subtype.as_deref(), self.bot_id.as_deref()) {
            (None, None) => MessageSubtype::New,
            (Some(MESSAGE_DELETED), _) => MessageSubtype::Deleted,
            (Some(other), _) => MessageSubtype::Unsupported(other.to_owned()),
            (None, Some(_)) => MessageSubtype::Unsupported("bot_message".to_owned()),
        };

        let previous = self.previous_message.unwrap_or_default();
        let previous_ts = previous.ts.or(self.deleted_ts);
        Some(InboundEvent::Message(MessageEvent {
            channel,
            message_body: self.text.unwrap_or_default(),
            message_ts: self.ts.unwrap_or_default(),
            subtype,
            previous_message_body: previous.text,
            previous_message_ts: previous_ts,
        }))
    }
}

/// Form body of a slash-command invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommandForm {
    /// Channel the command was run in.
    pub channel_id: String,
    /// Display name of that channel, used in the reply.
    #[serde(default)]
    pub channel_name: String,
    /// Arguments after the command name.
    #[serde(default)]
    pub text: String,
}

impl SlashCommandForm {
    /// The domain command carried by this invocation.
    pub fn to_inbound(&self) -> InboundEvent {
        InboundEvent::Command(CommandEvent {
            channel: self.channel_id.clone(),
            text: self.text.clone(),
        })
    }
}

/// Reply shown to the user who ran the slash command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlashCommandReply {
    /// Message shown to the invoking user.
    pub text: String,
}
