//! Inbound adapters that translate Slack deliveries into domain service calls
//! while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`].

pub mod http;
