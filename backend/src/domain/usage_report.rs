//! Reply values assembled after a ledger mutation.

use serde::Serialize;

/// Which mutation a [`UsageReport`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageKind {
    /// An expenditure was added to the ledger.
    Recorded,
    /// An expenditure was removed after its message was deleted.
    Retracted,
}

/// Identifies one of the four reply fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageField {
    /// Amount of the recorded or retracted expenditure.
    Usage,
    /// Budget left this month; negative once overspent.
    Remaining,
    /// Sum of the month's expenditures.
    MonthToDateTotal,
    /// Configured monthly budget.
    Limit,
}

/// The values a notifier renders for a recorded or retracted expenditure.
///
/// All quantities share the unit of the expenditure amount and channel
/// budget. `remaining` may be negative and is never clamped.
///
/// # Examples
/// ```
/// use moneysaver::domain::{UsageKind, UsageReport};
///
/// let report = UsageReport::new(UsageKind::Recorded, 500, 1_234, 1_000).expect("in range");
/// assert_eq!(report.remaining(), -234);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    kind: UsageKind,
    usage: i64,
    remaining: i64,
    total: i64,
    limit: i64,
}

impl UsageReport {
    /// Assemble a report, returning `None` if `limit - total` overflows.
    pub fn new(kind: UsageKind, usage: i64, total: i64, limit: i64) -> Option<Self> {
        let remaining = limit.checked_sub(total)?;
        Some(Self {
            kind,
            usage,
            remaining,
            total,
            limit,
        })
    }

    /// Whether the report follows a recording or a retraction.
    pub fn kind(&self) -> UsageKind {
        self.kind
    }

    /// Amount of the single record (or retracted record).
    pub fn usage(&self) -> i64 {
        self.usage
    }

    /// `limit - total`.
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Month-to-date total after the mutation.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Configured budget.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// The four fields in display order.
    pub fn fields(&self) -> [(UsageField, i64); 4] {
        [
            (UsageField::Usage, self.usage),
            (UsageField::Remaining, self.remaining),
            (UsageField::MonthToDateTotal, self.total),
            (UsageField::Limit, self.limit),
        ]
    }
}
