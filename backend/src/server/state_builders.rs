//! Adapter selection for the HTTP handler state.
//!
//! Settings decide between PostgreSQL and in-memory repositories and between
//! the Slack and log-only notifiers; the ledger service is then assembled
//! over whichever adapters were chosen.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use moneysaver::domain::LedgerService;
use moneysaver::domain::ports::{ChannelRepository, LedgerRepository, Notifier};
use moneysaver::inbound::http::signature::SignatureVerifier;
use moneysaver::inbound::http::state::HttpState;
use moneysaver::outbound::memory::{InMemoryChannelRepository, InMemoryLedgerRepository};
use moneysaver::outbound::persistence::{
    DbPool, DieselChannelRepository, DieselLedgerRepository, PoolConfig, run_pending_migrations,
};
use moneysaver::outbound::slack::{LogOnlyNotifier, SlackNotifier};

use super::config::{MoneysaverSettings, SettingsError};

type Repositories = (Arc<dyn ChannelRepository>, Arc<dyn LedgerRepository>);

async fn build_repositories(settings: &MoneysaverSettings) -> std::io::Result<Repositories> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database URL configured; ledger is held in memory and lost on restart");
        return Ok((
            Arc::new(InMemoryChannelRepository::new()),
            Arc::new(InMemoryLedgerRepository::new()),
        ));
    };

    let settings_error = |err: SettingsError| std::io::Error::other(err.to_string());
    let connect_lazily = settings.db_connect_lazily().map_err(settings_error)?;
    if settings.run_migrations().map_err(settings_error)? {
        run_pending_migrations(url)
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
    }

    let mut config = PoolConfig::new(url)
        .with_max_size(settings.db_max_connections())
        .with_checkout_timeout(settings.db_checkout_timeout());
    if connect_lazily {
        config = config.lazy();
    }
    let pool = DbPool::new(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(
        max_connections = settings.db_max_connections(),
        lazy = connect_lazily,
        "database pool ready"
    );

    Ok((
        Arc::new(DieselChannelRepository::new(pool.clone())),
        Arc::new(DieselLedgerRepository::new(pool)),
    ))
}

fn build_notifier(settings: &MoneysaverSettings) -> std::io::Result<Arc<dyn Notifier>> {
    let Some(token) = settings.slack_bot_token() else {
        warn!("no Slack bot token configured; replies are logged instead of posted");
        return Ok(Arc::new(LogOnlyNotifier));
    };
    let notifier = SlackNotifier::new(
        settings.slack_api_base_url(),
        token,
        settings.slack_timeout(),
    )
    .map_err(|err| std::io::Error::other(err.to_string()))?;
    Ok(Arc::new(notifier))
}

fn build_verifier(settings: &MoneysaverSettings) -> SignatureVerifier {
    let verifier = SignatureVerifier::new(settings.slack_signing_secret(), Arc::new(DefaultClock));
    if !verifier.is_enabled() {
        warn!("no Slack signing secret configured; request signatures are not verified");
    }
    verifier
}

/// Build handler state from settings, connecting to the database when one is
/// configured.
///
/// # Errors
///
/// Returns [`std::io::Error`] when migrations fail, the pool cannot be built
/// or the Slack client cannot be constructed.
pub async fn build_http_state(settings: &MoneysaverSettings) -> std::io::Result<HttpState> {
    let (channels, ledger) = build_repositories(settings).await?;
    let notifier = build_notifier(settings)?;
    let service = LedgerService::new(channels, ledger, notifier);
    Ok(HttpState::new(
        Arc::new(service),
        Arc::new(build_verifier(settings)),
    ))
}
