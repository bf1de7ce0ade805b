#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use pnlchart::calendar::Calendar;
use pnlchart::clock::FixedClock;
use pnlchart::models::{NormalizedRecord, RawRecord};
use pnlchart::series::SeriesBuilder;
use rust_decimal::Decimal;
use serde_json::json;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal")
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, 0)
        .single()
        .expect("valid timestamp")
}

/// 2026-10-19 20:00 UTC, the pinned "now" used across tests.
pub fn now() -> DateTime<Utc> {
    utc(2026, 10, 19, 20, 0)
}

pub fn builder_at(now: DateTime<Utc>, calendar: Calendar) -> SeriesBuilder {
    SeriesBuilder::new(calendar).with_clock(Arc::new(FixedClock::new(now)))
}

pub fn utc_builder() -> SeriesBuilder {
    builder_at(now(), Calendar::utc())
}

pub fn record(ts: DateTime<Utc>, value: &str, weight: &str) -> NormalizedRecord {
    NormalizedRecord::new(ts, dec(value), dec(weight))
}

pub fn trade_row(created_at: &str, profit: &str) -> RawRecord {
    json!({ "created_at": created_at, "profit": profit }).into()
}

pub fn trade_rows(n: usize, created_at: &str, profit: &str) -> Vec<RawRecord> {
    (0..n).map(|_| trade_row(created_at, profit)).collect()
}
