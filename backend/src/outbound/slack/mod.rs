//! Slack outbound adapters.
//!
//! [`SlackNotifier`] posts replies through the Web API `chat.postMessage`
//! method. [`LogOnlyNotifier`] stands in when no bot token is configured.

mod dto;
mod format;
mod http_notifier;
mod log_notifier;

pub use format::{FIELD_LABELS, RECORDED_HEADLINE, RETRACTED_HEADLINE, format_yen};
pub use http_notifier::{SlackNotifier, SlackNotifierBuildError};
pub use log_notifier::LogOnlyNotifier;
