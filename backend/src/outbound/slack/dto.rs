//! Wire types for `chat.postMessage`.
//!
//! Only the members this service sends or inspects are modelled.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct PostMessageDto<'a> {
    pub(super) channel: &'a str,
    pub(super) text: String,
    pub(super) username: &'static str,
    pub(super) icon_emoji: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) attachments: Vec<AttachmentDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct AttachmentDto {
    pub(super) fields: Vec<AttachmentFieldDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct AttachmentFieldDto {
    pub(super) title: &'static str,
    pub(super) value: String,
    pub(super) short: bool,
}

/// Slack answers `200` even for refused calls; `ok` carries the outcome.
#[derive(Debug, Deserialize)]
pub(super) struct PostMessageResponseDto {
    pub(super) ok: bool,
    #[serde(default)]
    pub(super) error: Option<String>,
}
