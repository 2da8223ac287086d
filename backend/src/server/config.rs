//! Runtime settings loaded via OrthoConfig and the derived server
//! configuration.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use moneysaver::inbound::http::state::HttpState;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_CHECKOUT_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";
const DEFAULT_SLACK_TIMEOUT_MS: u64 = 10_000;

/// Settings read from `MONEYSAVER_*` environment variables, CLI flags and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MONEYSAVER")]
pub struct MoneysaverSettings {
    /// Listener address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the ledger lives in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// How long a request waits for a pooled connection, in milliseconds.
    pub db_checkout_timeout_ms: Option<u64>,
    /// Start without a database connection and connect on first use
    /// (`true`/`false`, default `false`).
    pub db_connect_lazily: Option<String>,
    /// Apply embedded migrations before serving (`true`/`false`, default
    /// `true`).
    pub run_migrations: Option<String>,
    /// Bot token for `chat.postMessage`. Without it replies are only logged.
    pub slack_bot_token: Option<String>,
    /// Secret used to verify Slack request signatures.
    pub slack_signing_secret: Option<String>,
    /// Slack Web API base URL.
    pub slack_api_base_url: Option<String>,
    /// Timeout for Slack API calls in milliseconds.
    pub slack_timeout_ms: Option<u64>,
}

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    /// A switch is not one of `true`, `false`, `1`, `0`, `yes`, `no`.
    #[error("invalid value for {key}: {value}")]
    Switch { key: &'static str, value: String },
}

fn parse_switch(
    key: &'static str,
    value: Option<&str>,
    default: bool,
) -> Result<bool, SettingsError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::Switch {
            key,
            value: raw.to_owned(),
        }),
    }
}

impl MoneysaverSettings {
    /// Socket address the server listens on.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Maximum database pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    /// Pool checkout timeout.
    pub fn db_checkout_timeout(&self) -> Duration {
        Duration::from_millis(
            self.db_checkout_timeout_ms
                .unwrap_or(DEFAULT_DB_CHECKOUT_TIMEOUT_MS),
        )
    }

    /// Whether the pool defers connecting until the first checkout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Switch`] for values that are not a boolean.
    pub fn db_connect_lazily(&self) -> Result<bool, SettingsError> {
        parse_switch(
            "db_connect_lazily",
            self.db_connect_lazily.as_deref(),
            false,
        )
    }

    /// Whether embedded migrations run at start-up.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Switch`] for values that are not a boolean.
    pub fn run_migrations(&self) -> Result<bool, SettingsError> {
        parse_switch("run_migrations", self.run_migrations.as_deref(), true)
    }

    /// Slack Web API base URL.
    pub fn slack_api_base_url(&self) -> &str {
        self.slack_api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_SLACK_API_BASE_URL)
    }

    /// Timeout applied to each Slack API call.
    pub fn slack_timeout(&self) -> Duration {
        Duration::from_millis(self.slack_timeout_ms.unwrap_or(DEFAULT_SLACK_TIMEOUT_MS))
    }

    /// Bot token, wiped from memory when dropped.
    pub fn slack_bot_token(&self) -> Option<Zeroizing<String>> {
        non_blank(self.slack_bot_token.as_deref())
    }

    /// Signing secret, wiped from memory when dropped.
    pub fn slack_signing_secret(&self) -> Option<Zeroizing<String>> {
        non_blank(self.slack_signing_secret.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<Zeroizing<String>> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| Zeroizing::new(value.to_owned()))
}

/// Everything the HTTP server needs once adapters have been built.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Construct a server configuration around prepared handler state.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        http_state: HttpState,
        #[cfg(feature = "metrics")] prometheus: PrometheusMetrics,
    ) -> Self {
        Self {
            bind_addr,
            http_state,
            #[cfg(feature = "metrics")]
            prometheus,
        }
    }
}
