//! MoneySaver: a Slack-driven expenditure ledger with per-channel monthly
//! budgets.
//!
//! The crate is laid out hexagonally. [`domain`] holds the ledger model,
//! event interpretation and the service behind the driving port;
//! [`inbound`] adapts Slack's HTTP callbacks onto it; [`outbound`] provides
//! PostgreSQL, in-memory and Slack adapters for the driven ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
