use rust_decimal::Decimal;

use super::Bucket;
use crate::format::round2;
use crate::models::{BucketKey, PeriodSelector, SeriesPoint};

/// Turn reconciled buckets into plotted points.
///
/// Intraday is a running balance whose last point is pinned to the
/// authoritative total; daily and monthly points are independent deltas.
pub fn finalize(
    buckets: &[Bucket],
    selector: &PeriodSelector,
    authoritative_total: Option<Decimal>,
) -> Vec<SeriesPoint> {
    let mut sorted: Vec<&Bucket> = buckets.iter().collect();
    sorted.sort_by_key(|b| b.key);

    if !selector.is_intraday() {
        return sorted
            .into_iter()
            .map(|b| SeriesPoint::new(b.key, Some(round2(b.sum_value)), Some(b.sum_value)))
            .collect();
    }

    let mut running = Decimal::ZERO;
    let mut points: Vec<SeriesPoint> = sorted
        .into_iter()
        .map(|b| {
            running = running.saturating_add(b.sum_value);
            SeriesPoint::new(b.key, Some(round2(running)), Some(running))
        })
        .collect();

    if let (Some(total), Some(last)) = (authoritative_total, points.last_mut()) {
        last.display_value = Some(round2(total));
        last.raw_precise = Some(total);
    }
    points
}

/// The series for a run with no usable records at all.
///
/// Daily/monthly: every point is zero. Intraday: only the last point carries a
/// value (the authoritative total, or zero when it is missing), so the line
/// starts from nothing and ends on the server's balance.
pub fn empty_series(
    plan: &[BucketKey],
    selector: &PeriodSelector,
    authoritative_total: Option<Decimal>,
) -> Vec<SeriesPoint> {
    if !selector.is_intraday() {
        return plan
            .iter()
            .map(|key| SeriesPoint::new(*key, Some(Decimal::ZERO), Some(Decimal::ZERO)))
            .collect();
    }

    let last = plan.len().saturating_sub(1);
    let total = authoritative_total.unwrap_or(Decimal::ZERO);
    plan.iter()
        .enumerate()
        .map(|(i, key)| {
            if i == last {
                SeriesPoint::new(*key, Some(round2(total)), Some(total))
            } else {
                SeriesPoint::new(*key, None, None)
            }
        })
        .collect()
}
