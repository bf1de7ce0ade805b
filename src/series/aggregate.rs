use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::planner::bucket_for;
use super::reconcile::{total_value, ReconcileStrategy};
use crate::calendar::Calendar;
use crate::models::{BucketKey, NormalizedRecord, PeriodSelector};

/// Per-slot accumulator, owned by one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub sum_value: Decimal,
    pub sum_weight: Decimal,
}

impl Bucket {
    pub fn empty(key: BucketKey) -> Self {
        Self {
            key,
            sum_value: Decimal::ZERO,
            sum_weight: Decimal::ZERO,
        }
    }
}

/// What happened while folding and reconciling one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Bottom-up total before any reconciliation.
    pub raw_total: Decimal,
    pub authoritative_total: Option<Decimal>,
    pub tolerance: Decimal,
    /// The ladder rung applied, if the totals disagreed beyond tolerance.
    pub applied: Option<ReconcileStrategy>,
    /// Records that landed in a planned bucket.
    pub records_in_range: usize,
    /// Records outside every planned bucket (dropped).
    pub records_out_of_range: usize,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub buckets: Vec<Bucket>,
    pub report: ReconcileReport,
}

/// Fold `records` into the planned buckets and reconcile against the authoritative total.
///
/// - A missing total skips reconciliation; raw values stand.
/// - With no records at all there is nothing to shape, so reconciliation is skipped too.
/// - Within `tolerance` (inclusive) buckets keep full precision, untouched.
pub fn aggregate(
    records: &[NormalizedRecord],
    plan: &[BucketKey],
    selector: &PeriodSelector,
    authoritative_total: Option<Decimal>,
    tolerance: Decimal,
    calendar: &Calendar,
) -> Aggregation {
    let mut buckets: Vec<Bucket> = plan.iter().copied().map(Bucket::empty).collect();
    let index: HashMap<BucketKey, usize> = plan
        .iter()
        .enumerate()
        .map(|(i, key)| (*key, i))
        .collect();

    let mut in_range = 0usize;
    let mut out_of_range = 0usize;
    for record in records {
        let key = bucket_for(selector, record.timestamp, calendar);
        let Some(&i) = index.get(&key) else {
            out_of_range += 1;
            continue;
        };
        let bucket = &mut buckets[i];
        bucket.sum_value = bucket.sum_value.saturating_add(record.value);
        bucket.sum_weight = bucket.sum_weight.saturating_add(record.weight);
        in_range += 1;
    }

    let raw_total = total_value(&buckets);
    debug!(
        %selector,
        %raw_total,
        records_in_range = in_range,
        records_out_of_range = out_of_range,
        "Aggregated records into buckets"
    );

    let applied = match authoritative_total {
        None => None,
        Some(_) if records.is_empty() => None,
        Some(target) if (raw_total - target).abs() <= tolerance => None,
        Some(target) => {
            let strategy = ReconcileStrategy::select(&buckets);
            warn!(
                %selector,
                %raw_total,
                authoritative_total = %target,
                strategy = strategy.as_str(),
                "Bucket total disagrees with authoritative total; reconciling"
            );
            strategy.apply(&mut buckets, target);
            Some(strategy)
        }
    };

    Aggregation {
        buckets,
        report: ReconcileReport {
            raw_total,
            authoritative_total,
            tolerance,
            applied,
            records_in_range: in_range,
            records_out_of_range: out_of_range,
        },
    }
}
