//! Expenditure records, their idempotency keys and ledger partitions.
//!
//! An expenditure is keyed by the timestamp token of the chat message that
//! reported it. Slack renders these as `"<unix seconds>.<sequence>"`, unique
//! within a channel, so the token doubles as the idempotency key: replaying
//! the same message lands on the same ledger row.
//!
//! Records are grouped into partitions of one channel and one calendar month
//! (UTC), and totals are only ever computed over a single partition.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::ChannelId;

/// Last year a ledger month label can express in four digits.
const LAST_LEDGER_YEAR: i32 = 9999;

/// Validation errors for message timestamp tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageTsValidationError {
    /// The token was empty.
    #[error("message timestamp must not be empty")]
    Empty,
    /// The token is not `<digits>` or `<digits>.<digits>`.
    #[error("message timestamp must look like `<seconds>.<fraction>`: {value}")]
    Malformed { value: String },
    /// The seconds fall after the year 9999.
    #[error("message timestamp is outside the representable range: {value}")]
    OutOfRange { value: String },
}

/// Idempotency key derived from the source message's timestamp token.
///
/// The raw string is preserved exactly as delivered so it can be used as a
/// storage key; the wall-clock time is derived from its whole-second part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageTs {
    raw: String,
    seconds: i64,
}

impl MessageTs {
    /// Validate and construct a timestamp token.
    ///
    /// # Examples
    /// ```
    /// use moneysaver::domain::MessageTs;
    ///
    /// let ts = MessageTs::new("1355517523.000005").expect("valid token");
    /// assert_eq!(ts.occurred_at().timestamp(), 1_355_517_523);
    /// assert!(MessageTs::new("yesterday").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, MessageTsValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(MessageTsValidationError::Empty);
        }

        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (raw.as_str(), None),
        };
        let digits_only = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits_only(whole) || fraction.is_some_and(|part| !digits_only(part)) {
            return Err(MessageTsValidationError::Malformed { value: raw });
        }

        let seconds = whole
            .parse::<i64>()
            .map_err(|_| MessageTsValidationError::OutOfRange { value: raw.clone() })?;
        let in_range = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .is_some_and(|instant| instant.year() <= LAST_LEDGER_YEAR);
        if !in_range {
            return Err(MessageTsValidationError::OutOfRange { value: raw });
        }

        Ok(Self { raw, seconds })
    }

    /// Raw token as delivered by the chat platform.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Wall-clock time of the message, truncated to whole seconds.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        // Range was checked in `new`.
        Utc.timestamp_opt(self.seconds, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl fmt::Display for MessageTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MessageTs> for String {
    fn from(value: MessageTs) -> Self {
        value.raw
    }
}

impl TryFrom<String> for MessageTs {
    type Error = MessageTsValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors raised while parsing a `YYYY-MM` month label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ledger month must be formatted as YYYY-MM: {value}")]
pub struct LedgerMonthParseError {
    value: String,
}

/// Calendar month (UTC) used to partition the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerMonth {
    year: i32,
    month: u32,
}

impl LedgerMonth {
    /// Month containing the given instant.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// Construct a month from its parts; `month` is 1-based.
    pub fn from_parts(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (0..=LAST_LEDGER_YEAR).contains(&year))
            .then_some(Self { year, month })
    }

    /// Four-digit year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// Month of year, 1-based.
    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for LedgerMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for LedgerMonth {
    type Err = LedgerMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || LedgerMonthParseError {
            value: s.to_owned(),
        };
        let (year, month) = s.split_once('-').ok_or_else(error)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(error());
        }
        let year = year.parse::<i32>().map_err(|_| error())?;
        let month = month.parse::<u32>().map_err(|_| error())?;
        Self::from_parts(year, month).ok_or_else(error)
    }
}

/// The `(channel, month)` scope in which records are keyed and summed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerPartition {
    /// Owning channel.
    pub channel: ChannelId,
    /// Calendar month of the records.
    pub month: LedgerMonth,
}

impl LedgerPartition {
    /// Partition holding records for `channel` at `instant`.
    pub fn new(channel: ChannelId, instant: DateTime<Utc>) -> Self {
        Self {
            channel,
            month: LedgerMonth::containing(instant),
        }
    }
}

impl fmt::Display for LedgerPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel, self.month)
    }
}

/// One recorded expenditure.
///
/// Amounts are stored exactly as reported; retraction deletes the record
/// rather than storing a negated copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expenditure {
    channel: ChannelId,
    key: MessageTs,
    amount: i64,
    occurred_at: DateTime<Utc>,
}

impl Expenditure {
    /// Build an expenditure whose time is derived from its key.
    pub fn new(channel: ChannelId, key: MessageTs, amount: i64) -> Self {
        let occurred_at = key.occurred_at();
        Self {
            channel,
            key,
            amount,
            occurred_at,
        }
    }

    /// Owning channel.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Idempotency key (source message timestamp).
    pub fn idempotency_key(&self) -> &MessageTs {
        &self.key
    }

    /// Reported amount.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Wall-clock time derived from the key.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Partition this record belongs to.
    pub fn partition(&self) -> LedgerPartition {
        LedgerPartition::new(self.channel.clone(), self.occurred_at)
    }
}

/// Request to retract the expenditure recorded for a deleted message.
///
/// `amount` is recovered from the deleted message's original body and is
/// only used for the reply; removal is keyed by partition and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retraction {
    channel: ChannelId,
    key: MessageTs,
    amount: i64,
    occurred_at: DateTime<Utc>,
}

impl Retraction {
    /// Build a retraction for the message identified by `key`.
    pub fn new(channel: ChannelId, key: MessageTs, amount: i64) -> Self {
        let occurred_at = key.occurred_at();
        Self {
            channel,
            key,
            amount,
            occurred_at,
        }
    }

    /// Owning channel.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Key of the record to remove.
    pub fn idempotency_key(&self) -> &MessageTs {
        &self.key
    }

    /// Amount reported by the deleted message.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Wall-clock time of the original message.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Partition holding the record to remove.
    pub fn partition(&self) -> LedgerPartition {
        LedgerPartition::new(self.channel.clone(), self.occurred_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn channel() -> ChannelId {
        ChannelId::new("C1").expect("valid channel")
    }

    #[rstest]
    #[case("111.0", 111)]
    #[case("1355517523.000005", 1_355_517_523)]
    #[case("1700000000", 1_700_000_000)]
    fn message_ts_derives_whole_seconds(#[case] raw: &str, #[case] seconds: i64) {
        let ts = MessageTs::new(raw).expect("valid ts");
        assert_eq!(ts.as_str(), raw);
        assert_eq!(ts.occurred_at().timestamp(), seconds);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("12.3.4")]
    #[case("-1.0")]
    #[case(".5")]
    #[case("5.")]
    #[case(" 111.0")]
    #[case("99999999999999999999.0")]
    fn message_ts_rejects_malformed_tokens(#[case] raw: &str) {
        assert!(MessageTs::new(raw).is_err(), "{raw:?} should be rejected");
    }

    #[rstest]
    #[case("253402300799.000100", Some("9999-12"))]
    #[case("253402300800.000100", None)]
    #[case("316224000000.0", None)]
    fn message_ts_stays_within_four_digit_years(
        #[case] raw: &str,
        #[case] expected: Option<&str>,
    ) {
        let month = MessageTs::new(raw)
            .ok()
            .map(|ts| LedgerMonth::containing(ts.occurred_at()).to_string());
        assert_eq!(month.as_deref(), expected);
        if let Some(label) = month {
            assert!(label.parse::<LedgerMonth>().is_ok());
        } else {
            assert!(matches!(
                MessageTs::new(raw),
                Err(MessageTsValidationError::OutOfRange { .. })
            ));
        }
    }

    #[rstest]
    fn ledger_month_formats_and_parses() {
        let instant = Utc
            .with_ymd_and_hms(2024, 3, 31, 23, 59, 59)
            .single()
            .expect("valid instant");
        let month = LedgerMonth::containing(instant);
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!("2024-03".parse::<LedgerMonth>(), Ok(month));
    }

    #[rstest]
    #[case("2024-3")]
    #[case("2024-13")]
    #[case("24-03")]
    #[case("2024/03")]
    fn ledger_month_rejects_bad_labels(#[case] raw: &str) {
        assert!(raw.parse::<LedgerMonth>().is_err());
    }

    #[rstest]
    fn month_boundary_splits_partitions() {
        // 2024-01-31T23:59:59Z and 2024-02-01T00:00:00Z
        let january = Expenditure::new(channel(), MessageTs::new("1706745599.000100").expect("ts"), 1);
        let february = Expenditure::new(channel(), MessageTs::new("1706745600.000100").expect("ts"), 1);

        assert_eq!(january.partition().month.to_string(), "2024-01");
        assert_eq!(february.partition().month.to_string(), "2024-02");
        assert_ne!(january.partition(), february.partition());
    }

    #[rstest]
    fn retraction_targets_the_same_partition_as_the_original() {
        let ts = MessageTs::new("111.0").expect("ts");
        let expenditure = Expenditure::new(channel(), ts.clone(), 500);
        let retraction = Retraction::new(channel(), ts, 500);

        assert_eq!(expenditure.partition(), retraction.partition());
        assert_eq!(expenditure.idempotency_key(), retraction.idempotency_key());
        assert_eq!(retraction.partition().to_string(), "C1/1970-01");
    }
}
