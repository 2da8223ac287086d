//! HTTP inbound adapter exposing the Slack endpoints and health probes.

pub mod commands;
pub mod error;
pub mod events;
pub mod health;
pub mod signature;
pub mod slack_dto;
pub mod state;

pub use error::ApiResult;
