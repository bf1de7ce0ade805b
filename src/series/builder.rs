use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use super::aggregate::{aggregate, ReconcileReport};
use super::finalize::{empty_series, finalize};
use super::normalize::normalize;
use super::planner::plan_buckets;
use crate::calendar::Calendar;
use crate::clock::{Clock, SystemClock};
use crate::models::{BucketKey, NormalizedRecord, PeriodSelector, RawRecord, SeriesPoint};

/// Default reconciliation tolerance, in currency units.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(50, 0, 0, false, 2);

/// One parametrized pipeline: plan, aggregate, reconcile, finalize.
#[derive(Clone)]
pub struct SeriesBuilder {
    calendar: Calendar,
    tolerance: Decimal,
    clock: Arc<dyn Clock>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRun {
    pub selector: PeriodSelector,
    pub points: Vec<SeriesPoint>,
    pub report: ReconcileReport,
}

impl SeriesBuilder {
    pub fn new(calendar: Calendar) -> Self {
        Self {
            calendar,
            tolerance: DEFAULT_TOLERANCE,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn plan(&self, selector: &PeriodSelector) -> Vec<BucketKey> {
        plan_buckets(selector, self.clock.now(), &self.calendar)
    }

    /// Run the pipeline over already-normalized records.
    pub fn build(
        &self,
        records: &[NormalizedRecord],
        authoritative_total: Option<Decimal>,
        selector: &PeriodSelector,
    ) -> SeriesRun {
        let plan = self.plan(selector);
        let aggregation = aggregate(
            records,
            &plan,
            selector,
            authoritative_total,
            self.tolerance,
            &self.calendar,
        );

        let points = if records.is_empty() {
            empty_series(&plan, selector, authoritative_total)
        } else {
            finalize(&aggregation.buckets, selector, authoritative_total)
        };

        SeriesRun {
            selector: *selector,
            points,
            report: aggregation.report,
        }
    }

    /// Normalize trade rows with this builder's calendar, then build.
    pub fn build_from_trades(
        &self,
        raw: &[RawRecord],
        authoritative_total: Option<Decimal>,
        selector: &PeriodSelector,
    ) -> SeriesRun {
        let records = normalize(raw, &self.calendar);
        self.build(&records, authoritative_total, selector)
    }
}

impl std::fmt::Debug for SeriesBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesBuilder")
            .field("calendar", &self.calendar)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::series::ReconcileStrategy;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn builder() -> SeriesBuilder {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap();
        SeriesBuilder::new(Calendar::utc()).with_clock(Arc::new(FixedClock::new(now)))
    }

    #[test]
    fn default_tolerance_is_half_a_unit() {
        assert_eq!(DEFAULT_TOLERANCE, dec("0.50"));
        assert_eq!(builder().tolerance(), dec("0.50"));
    }

    #[test]
    fn builds_from_raw_trade_rows() {
        let rows: Vec<RawRecord> = vec![
            json!({"created_at": "2026-10-18T10:00:00Z", "profit": "12.50"}).into(),
            json!({"created_at": "2026-10-19T08:00:00Z", "pnl": -2.5}).into(),
            json!({"profit": 1000}).into(),
        ];
        let run = builder().build_from_trades(&rows, Some(dec("10")), &PeriodSelector::LastDays { days: 2 });
        let display: Vec<_> = run.points.iter().map(|p| p.display_value).collect();
        assert_eq!(display, vec![Some(dec("12.50")), Some(dec("-2.50"))]);
        assert_eq!(run.report.applied, None);
        assert_eq!(run.report.records_in_range, 2);
    }

    #[test]
    fn tolerance_is_configurable() {
        let records = vec![NormalizedRecord::new(
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            dec("10"),
            Decimal::ZERO,
        )];
        let strict = builder().with_tolerance(dec("0.01"));
        let run = strict.build(&records, Some(dec("10.20")), &PeriodSelector::LastDays { days: 1 });
        assert_eq!(run.report.applied, Some(ReconcileStrategy::Scale));

        let loose = builder().with_tolerance(dec("1"));
        let run = loose.build(&records, Some(dec("10.20")), &PeriodSelector::LastDays { days: 1 });
        assert_eq!(run.report.applied, None);
    }

    #[test]
    fn empty_records_use_the_empty_series() {
        let run = builder().build(&[], Some(dec("7")), &PeriodSelector::Today);
        assert_eq!(run.points.len(), 24);
        assert!(run.points[0].display_value.is_none());
        assert_eq!(run.points[23].display_value, Some(dec("7.00")));
    }
}
