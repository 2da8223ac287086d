//! Reqwest-backed Slack notifier.
//!
//! Owns transport details only: request serialisation, bearer
//! authentication, timeout and status mapping, and decoding Slack's
//! `{ok, error}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{PostMessageDto, PostMessageResponseDto};
use super::format::{failure_message, usage_message};
use crate::domain::ChannelId;
use crate::domain::UsageReport;
use crate::domain::ports::{Notifier, NotifierError};

const POST_MESSAGE_METHOD: &str = "chat.postMessage";

/// Errors raised while constructing a [`SlackNotifier`].
#[derive(Debug, thiserror::Error)]
pub enum SlackNotifierBuildError {
    /// The API base URL could not be parsed.
    #[error("invalid Slack API base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    /// The HTTP client could not be constructed.
    #[error("failed to build Slack HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Notifier that posts to a Slack workspace as the MoneySaver bot.
pub struct SlackNotifier {
    client: Client,
    endpoint: Url,
    token: Zeroizing<String>,
}

impl SlackNotifier {
    /// Build a notifier for `api_base_url` (for example
    /// `https://slack.com/api`) with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the reqwest client
    /// cannot be constructed.
    pub fn new(
        api_base_url: &str,
        token: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, SlackNotifierBuildError> {
        let endpoint = endpoint_for(api_base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    async fn post(&self, message: &PostMessageDto<'_>) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.token.as_str())
            .json(message)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        check_envelope(body.as_ref())?;
        debug!(channel = message.channel, "slack reply delivered");
        Ok(())
    }
}

fn endpoint_for(api_base_url: &str) -> Result<Url, SlackNotifierBuildError> {
    let invalid = |message: String| SlackNotifierBuildError::InvalidBaseUrl {
        url: api_base_url.to_owned(),
        message,
    };
    let base = Url::parse(&format!("{}/", api_base_url.trim_end_matches('/')))
        .map_err(|err| invalid(err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_owned()));
    }
    base.join(POST_MESSAGE_METHOD)
        .map_err(|err| invalid(err.to_string()))
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_usage(
        &self,
        channel: &ChannelId,
        report: &UsageReport,
    ) -> Result<(), NotifierError> {
        self.post(&usage_message(channel.as_str(), report)).await
    }

    async fn notify_failure(
        &self,
        channel: &ChannelId,
        message: &str,
    ) -> Result<(), NotifierError> {
        self.post(&failure_message(channel.as_str(), message)).await
    }
}

fn check_envelope(body: &[u8]) -> Result<(), NotifierError> {
    let envelope: PostMessageResponseDto = serde_json::from_slice(body).map_err(|error| {
        NotifierError::decode(format!("invalid chat.postMessage payload: {error}"))
    })?;
    if envelope.ok {
        Ok(())
    } else {
        Err(NotifierError::rejected(
            envelope.error.unwrap_or_else(|| "unknown_error".to_owned()),
        ))
    }
}

fn map_transport_error(error: reqwest::Error) -> NotifierError {
    NotifierError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NotifierError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    if status.is_client_error() {
        NotifierError::rejected(message)
    } else {
        NotifierError::transport(message)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
