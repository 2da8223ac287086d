//! Actix middleware wrapped around every Slack endpoint.
//!
//! [`Trace`] assigns the correlation identifier that appears in logs, error
//! bodies and the `trace-id` response header.

pub mod trace;

pub use trace::Trace;
