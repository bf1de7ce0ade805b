use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DisplayConfig;
use crate::models::BucketKey;

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // Drop the sign of a rounded-away negative (e.g. -0.001 -> 0.00).
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Canonical string form for serialized output: rounded and padded to exactly 2 dp.
pub fn decimal_2dp(value: Decimal) -> String {
    pad_fraction_to_dp(&round2(value).to_string(), 2)
}

/// Full-precision string form, trailing zeros stripped.
pub fn decimal_precise(value: Decimal) -> String {
    value.normalize().to_string()
}

fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: usize) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    let mut out = String::with_capacity(int_part.len() + 1 + dp);
    out.push_str(int_part);
    out.push('.');
    let mut written = 0usize;
    for ch in frac_part.chars().take(dp) {
        out.push(ch);
        written += 1;
    }
    while written < dp {
        out.push('0');
        written += 1;
    }
    out
}

/// Format a money value for human display (tables, tooltips).
///
/// Always 2 decimal places; the sign precedes the symbol (`-$1,234.50`).
pub fn format_money(value: Decimal, display: &DisplayConfig) -> String {
    let rounded = round2(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let mut s = pad_fraction_to_dp(&rounded.abs().to_string(), 2);
    if display.currency_grouping {
        s = match s.split_once('.') {
            Some((int_part, frac)) => format!("{}.{frac}", group_int_digits(int_part)),
            None => group_int_digits(&s),
        };
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if let Some(sym) = &display.currency_symbol {
        out.push_str(sym);
    }
    out.push_str(&s);
    out
}

/// Short human date: `Oct 5`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Human label for a bucket: `HH:00` for hours, `Mon D` for days.
pub fn bucket_label(key: &BucketKey) -> String {
    match key {
        BucketKey::Hour { .. } => key.default_label(),
        BucketKey::Day { date } => day_label(*date),
    }
}
