//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed ledger model shared by the HTTP and
//! persistence adapters. Types are immutable once constructed and document
//! their invariants in Rustdoc.
//!
//! Public surface:
//! - Channel, ChannelId, BudgetMutation: per-channel budget configuration.
//! - Expenditure, Retraction, MessageTs, LedgerMonth, LedgerPartition: ledger
//!   records and their keying scheme.
//! - InboundEvent, Interpretation, interpret: event classification.
//! - UsageReport: values handed to the notifier.
//! - LedgerService: implementation of the `LedgerCommand` driving port.
//! - Error, ErrorCode, TraceId: transport-agnostic failures and correlation.

pub mod channel;
pub mod error;
pub mod event_interpreter;
pub mod expenditure;
pub mod ledger_service;
pub mod ports;
pub mod trace_id;
pub mod usage_report;

pub use self::channel::{BudgetMutation, Channel, ChannelId, ChannelValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::event_interpreter::{
    CommandEvent, CommandRejection, IgnoreReason, InboundEvent, Interpretation, MessageEvent,
    MessageSubtype, interpret, parse_amount,
};
pub use self::expenditure::{
    Expenditure, LedgerMonth, LedgerMonthParseError, LedgerPartition, MessageTs,
    MessageTsValidationError, Retraction,
};
pub use self::ledger_service::LedgerService;
pub use self::trace_id::TraceId;
pub use self::usage_report::{UsageField, UsageKind, UsageReport};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use moneysaver::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("bad signature"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
