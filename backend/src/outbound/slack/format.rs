//! Presentation of usage reports as Slack messages.

use crate::domain::{UsageField, UsageKind, UsageReport};

use super::dto::{AttachmentDto, AttachmentFieldDto, PostMessageDto};

/// Headline posted after an expenditure is recorded.
pub const RECORDED_HEADLINE: &str = "カード利用を登録しました";
/// Headline posted after an expenditure is retracted.
pub const RETRACTED_HEADLINE: &str = "カード利用を取り消しました";

/// Field labels in reply order: usage, remaining, month-to-date, limit.
pub const FIELD_LABELS: [&str; 4] = [
    "利用額",
    "今月の利用可能残額",
    "今月の合計利用額",
    "今月の設定上限額",
];

const BOT_USERNAME: &str = "MoneySaver";
const BOT_ICON: &str = ":money_with_wings:";

/// Render an amount as yen with thousands separators.
///
/// Negative values keep their sign ahead of the currency glyph.
///
/// # Examples
/// ```
/// use moneysaver::outbound::slack::format_yen;
///
/// assert_eq!(format_yen(1_234), "¥1,234");
/// assert_eq!(format_yen(-234), "-¥234");
/// assert_eq!(format_yen(0), "¥0");
/// ```
pub fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}¥{grouped}")
}

fn label(field: UsageField) -> &'static str {
    let [usage, remaining, total, limit] = FIELD_LABELS;
    match field {
        UsageField::Usage => usage,
        UsageField::Remaining => remaining,
        UsageField::MonthToDateTotal => total,
        UsageField::Limit => limit,
    }
}

pub(super) fn usage_message<'a>(channel: &'a str, report: &UsageReport) -> PostMessageDto<'a> {
    let headline = match report.kind() {
        UsageKind::Recorded => RECORDED_HEADLINE,
        UsageKind::Retracted => RETRACTED_HEADLINE,
    };
    let fields = report
        .fields()
        .into_iter()
        .map(|(field, value)| AttachmentFieldDto {
            title: label(field),
            value: format_yen(value),
            short: true,
        })
        .collect();

    PostMessageDto {
        channel,
        text: headline.to_owned(),
        username: BOT_USERNAME,
        icon_emoji: BOT_ICON,
        attachments: vec![AttachmentDto { fields }],
    }
}

pub(super) fn failure_message<'a>(channel: &'a str, message: &str) -> PostMessageDto<'a> {
    PostMessageDto {
        channel,
        text: format!("```\n{message}\n```"),
        username: BOT_USERNAME,
        icon_emoji: BOT_ICON,
        attachments: Vec::new(),
    }
}
