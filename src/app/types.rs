use serde::Serialize;

use super::{ChartResult, TradingStats};
use crate::calendar::Calendar;
use crate::format::{decimal_2dp, decimal_precise};
use crate::models::SeriesPoint;
use crate::series::ReconcileReport;

/// JSON output for one plotted point
#[derive(Debug, Serialize)]
pub struct PointOutput {
    pub key: String,
    pub label: String,
    /// 2 dp; `null` for the leading points of an empty intraday series.
    pub value: Option<String>,
    pub precise: Option<String>,
}

impl From<&SeriesPoint> for PointOutput {
    fn from(point: &SeriesPoint) -> Self {
        Self {
            key: point.key.to_string(),
            label: point.label.clone(),
            value: point.display_value.map(decimal_2dp),
            precise: point.raw_precise.map(decimal_precise),
        }
    }
}

/// JSON output for the reconciliation step
#[derive(Debug, Serialize)]
pub struct ReconcileOutput {
    pub raw_total: String,
    pub tolerance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    pub records_in_range: usize,
    pub records_out_of_range: usize,
}

impl From<&ReconcileReport> for ReconcileOutput {
    fn from(report: &ReconcileReport) -> Self {
        Self {
            raw_total: decimal_precise(report.raw_total),
            tolerance: decimal_precise(report.tolerance),
            strategy: report.applied.map(|s| s.as_str().to_string()),
            records_in_range: report.records_in_range,
            records_out_of_range: report.records_out_of_range,
        }
    }
}

/// JSON output for trading statistics
#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub total_orders: u64,
    pub buy_orders: u64,
    pub sell_orders: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate_percent: String,
    pub using_server_totals: bool,
    pub in_trade: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accumulated_r: Option<String>,
}

impl StatsOutput {
    pub fn new(stats: &TradingStats, in_trade: bool, accumulated_r: Option<String>) -> Self {
        Self {
            total_orders: stats.total_orders,
            buy_orders: stats.buy_orders,
            sell_orders: stats.sell_orders,
            wins: stats.wins,
            losses: stats.losses,
            win_rate_percent: format!("{:.1}", stats.win_rate_percent),
            using_server_totals: stats.using_server_totals,
            in_trade,
            accumulated_r,
        }
    }
}

/// Output for the chart command
#[derive(Debug, Serialize)]
pub struct ChartOutput {
    pub selector: String,
    pub timezone: String,
    pub strategy: String,
    pub authoritative_total: Option<String>,
    pub rows_fetched: usize,
    pub reconcile: ReconcileOutput,
    pub points: Vec<PointOutput>,
    pub stats: StatsOutput,
}

impl ChartOutput {
    pub fn new(result: &ChartResult, calendar: &Calendar) -> Self {
        let metrics = &result.metrics;
        Self {
            selector: result.query.selector.to_string(),
            timezone: calendar.label(),
            strategy: result.query.strategy.as_str().to_string(),
            authoritative_total: metrics.money_made.map(decimal_2dp),
            rows_fetched: result.rows_fetched,
            reconcile: ReconcileOutput::from(&result.run.report),
            points: result.run.points.iter().map(PointOutput::from).collect(),
            stats: StatsOutput::new(
                &result.stats,
                metrics.in_trade,
                metrics.accumulated_r.map(decimal_precise),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BucketKey;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn point_output_formats_values() {
        let key = BucketKey::hour(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), 9);
        let point = SeriesPoint::new(
            key,
            Some(Decimal::from_str("37.5").unwrap()),
            Some(Decimal::from_str("37.500").unwrap()),
        );
        let out = PointOutput::from(&point);
        assert_eq!(out.key, "2026-10-19T09");
        assert_eq!(out.label, "09:00");
        assert_eq!(out.value.as_deref(), Some("37.50"));
        assert_eq!(out.precise.as_deref(), Some("37.5"));

        let empty = PointOutput::from(&SeriesPoint::new(key, None, None));
        let json = serde_json::to_value(&empty).unwrap();
        assert!(json["value"].is_null());
    }
}
