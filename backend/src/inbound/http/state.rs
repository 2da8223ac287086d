//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FixtureLedgerCommand, LedgerCommand};
use crate::inbound::http::signature::SignatureVerifier;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Driving port that applies events to the ledger.
    pub ledger: Arc<dyn LedgerCommand>,
    /// Slack request signature check.
    pub verifier: Arc<SignatureVerifier>,
}

impl HttpState {
    /// Construct state from the ledger port and a signature verifier.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use moneysaver::domain::ports::FixtureLedgerCommand;
    /// use moneysaver::inbound::http::signature::SignatureVerifier;
    /// use moneysaver::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureLedgerCommand),
    ///     Arc::new(SignatureVerifier::disabled()),
    /// );
    /// assert!(!state.verifier.is_enabled());
    /// ```
    pub fn new(ledger: Arc<dyn LedgerCommand>, verifier: Arc<SignatureVerifier>) -> Self {
        Self { ledger, verifier }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureLedgerCommand),
            Arc::new(SignatureVerifier::disabled()),
        )
    }
}
