//! Display helpers for amounts and server timestamps.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::{BackofficeError, Result};

/// Group digits of an integer with commas
pub fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Two decimals with thousands separators, e.g. `12,345.60`
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let negative = whole.starts_with('-');
    let digits = whole.trim_start_matches('-');
    let grouped = format_grouped_int(digits.parse::<i64>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Amount prefixed with the currency symbol, e.g. `MT 1,500.00`
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    format!("{} {}", currency_symbol, format_amount(value))
}

/// Quantities drop the decimals when they are whole
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format_grouped_int(value as i64)
    } else {
        format!("{:.3}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

pub fn parse_offset(offset: &str) -> FixedOffset {
    offset
        .parse::<FixedOffset>()
        .unwrap_or_else(|_| Utc.fix())
}

/// Render a server timestamp in local time.
///
/// Timestamps without a zone are UTC. Plain dates are shown as-is and
/// anything unparseable is returned unchanged.
pub fn format_timestamp(raw: &str, offset: FixedOffset) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "-".to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt
            .with_timezone(&offset)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return offset
                .from_utc_datetime(&naive)
                .format("%d/%m/%Y %H:%M:%S")
                .to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    raw.to_string()
}

/// Validate a `YYYY-MM-DD` command-line date, keeping the canonical text
pub fn parse_day(input: &str) -> Result<String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| BackofficeError::InvalidDate(input.to_string()))
}

/// Parse a user-typed amount; a decimal comma is accepted
pub fn parse_amount(input: &str) -> Option<f64> {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
