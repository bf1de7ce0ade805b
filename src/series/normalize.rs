//! Reduce raw trade rows and balance snapshots to `NormalizedRecord`s.
//!
//! Nothing in here fails: a record without a usable timestamp is dropped,
//! and any value that cannot be computed degrades to zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::calendar::Calendar;
use crate::models::{NormalizedRecord, RawRecord};
use crate::numeric::{is_truthy, parse_decimal};

const TIMESTAMP_KEYS: &[&str] = &["created_at", "timestamp", "date"];
const PROFIT_KEYS: &[&str] = &[
    "profit",
    "pnl",
    "pl",
    "realized_pnl",
    "realizedPnl",
    "profit_amount",
    "gain",
    "money_made",
    "profit_usd",
    "pnl_usd",
];
const PRICE_KEYS: &[&str] = &["price", "entry_price"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty"];
const TAKE_PROFIT_KEYS: &[&str] = &["take_profit", "tp"];
const STOP_LOSS_KEYS: &[&str] = &["stop_loss", "sl"];
const OUTCOME_KEYS: &[&str] = &["status", "result"];
const BALANCE_KEYS: &[&str] = &["balance", "equity", "total_balance", "wallet_balance", "value"];

/// Epoch values above this magnitude are milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize trade rows. Rows without a parseable timestamp are dropped.
pub fn normalize(raw: &[RawRecord], calendar: &Calendar) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = raw
        .iter()
        .filter_map(|record| normalize_trade(record, calendar))
        .collect();

    let dropped = raw.len() - records.len();
    if dropped > 0 {
        debug!(dropped, kept = records.len(), "Dropped records without a usable timestamp");
    }
    records
}

/// Normalize a single trade row.
pub fn normalize_trade(record: &RawRecord, calendar: &Calendar) -> Option<NormalizedRecord> {
    let timestamp = resolve_timestamp(record, calendar)?;
    let price = record.first_number(PRICE_KEYS);
    let quantity = record.first_number(QUANTITY_KEYS);

    let value = explicit_profit(record)
        .unwrap_or_else(|| synthetic_profit(record, price, quantity));
    let weight = match (price, quantity) {
        (Some(p), Some(q)) => p.checked_mul(q).map(|n| n.abs()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    Some(NormalizedRecord::new(timestamp, value, weight))
}

/// Convert a balance-snapshot feed into per-snapshot deltas.
///
/// Snapshots are ordered by timestamp (ties keep feed order). The first
/// delta is measured against `opening_balance`, or is zero without one.
/// Snapshots without a balance are dropped since there is nothing to diff.
pub fn normalize_snapshots(
    raw: &[RawRecord],
    calendar: &Calendar,
    opening_balance: Option<Decimal>,
) -> Vec<NormalizedRecord> {
    let mut levels: Vec<(DateTime<Utc>, Decimal)> = raw
        .iter()
        .filter_map(|record| {
            let timestamp = resolve_timestamp(record, calendar)?;
            let balance = record.first_number(BALANCE_KEYS)?;
            Some((timestamp, balance))
        })
        .collect();
    levels.sort_by_key(|(timestamp, _)| *timestamp);

    let dropped = raw.len() - levels.len();
    if dropped > 0 {
        debug!(dropped, kept = levels.len(), "Dropped balance snapshots without timestamp or balance");
    }

    let mut previous = opening_balance;
    levels
        .into_iter()
        .map(|(timestamp, balance)| {
            let delta = previous
                .and_then(|p| balance.checked_sub(p))
                .unwrap_or(Decimal::ZERO);
            previous = Some(balance);
            NormalizedRecord::new(timestamp, delta, delta.abs())
        })
        .collect()
}

fn explicit_profit(record: &RawRecord) -> Option<Decimal> {
    PROFIT_KEYS
        .iter()
        .filter_map(|k| record.present(k))
        .find_map(parse_decimal)
}

/// Profit implied by entry, target and stop when the row carries no profit field.
fn synthetic_profit(
    record: &RawRecord,
    price: Option<Decimal>,
    quantity: Option<Decimal>,
) -> Decimal {
    let price = price.unwrap_or(Decimal::ZERO);
    let quantity = quantity.unwrap_or(Decimal::ZERO);
    let take = record
        .first_number(TAKE_PROFIT_KEYS)
        .filter(|d| !d.is_zero())
        .unwrap_or(price);
    let stop = record
        .first_number(STOP_LOSS_KEYS)
        .filter(|d| !d.is_zero())
        .unwrap_or(price);

    let won = record
        .first_text(OUTCOME_KEYS)
        .is_some_and(|s| s.eq_ignore_ascii_case("win"))
        || record.fields().get("is_win").is_some_and(is_truthy);
    let exit = if won { take } else { stop };

    let side = record.first_text(&["side"]).map(|s| s.to_uppercase());
    let per_unit = match side.as_deref() {
        Some("BUY") => exit.checked_sub(price),
        Some("SELL") => price.checked_sub(exit),
        // A numeric `profit` would already have been taken as explicit profit.
        _ => return Decimal::ZERO,
    };

    per_unit
        .and_then(|p| p.checked_mul(quantity))
        .unwrap_or(Decimal::ZERO)
}

fn resolve_timestamp(record: &RawRecord, calendar: &Calendar) -> Option<DateTime<Utc>> {
    TIMESTAMP_KEYS
        .iter()
        .filter_map(|k| record.present(k))
        .find_map(|v| parse_timestamp(v, calendar))
}

/// Parse a timestamp value; naive date-times are read in `calendar`.
pub fn parse_timestamp(value: &Value, calendar: &Calendar) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })?;
            from_epoch(raw)
        }
        Value::String(s) => parse_timestamp_str(s.trim(), calendar),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str, calendar: &Calendar) -> Option<DateTime<Utc>> {
    if let Ok(epoch) = s.parse::<i64>() {
        return from_epoch(epoch);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return calendar.resolve_local(naive);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| calendar.start_of_day(date))
}

fn from_epoch(raw: i64) -> Option<DateTime<Utc>> {
    if raw.unsigned_abs() > EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}
