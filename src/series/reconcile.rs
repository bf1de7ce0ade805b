//! The reconciliation ladder: force bucket sums onto the authoritative total.
//!
//! Each rung is a named strategy so it can be selected and exercised on its own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Bucket;

/// Totals at or below this magnitude are treated as zero.
pub const NEGLIGIBLE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// Multiply every bucket by `target / raw_total`, keeping the shape.
    Scale,
    /// Spread `target` in proportion to each bucket's share of total weight.
    WeightProportional,
    /// Spread `target` evenly across all buckets.
    EqualSpread,
}

impl ReconcileStrategy {
    /// First applicable rung: scale, then weight-proportional, then equal spread.
    pub fn select(buckets: &[Bucket]) -> Self {
        if total_value(buckets).abs() > NEGLIGIBLE {
            ReconcileStrategy::Scale
        } else if total_weight(buckets) > NEGLIGIBLE {
            ReconcileStrategy::WeightProportional
        } else {
            ReconcileStrategy::EqualSpread
        }
    }

    /// Rewrite `sum_value` of every bucket so they add up to `target`.
    ///
    /// Applying a rung whose precondition does not hold (a zero raw total for
    /// `Scale`, zero weight for `WeightProportional`) leaves values at zero
    /// rather than dividing by zero.
    pub fn apply(self, buckets: &mut [Bucket], target: Decimal) {
        match self {
            ReconcileStrategy::Scale => {
                let raw_total = total_value(buckets);
                for bucket in buckets.iter_mut() {
                    bucket.sum_value = share(bucket.sum_value, target, raw_total);
                }
            }
            ReconcileStrategy::WeightProportional => {
                let weight = total_weight(buckets);
                for bucket in buckets.iter_mut() {
                    bucket.sum_value = share(bucket.sum_weight, target, weight);
                }
            }
            ReconcileStrategy::EqualSpread => {
                if buckets.is_empty() {
                    return;
                }
                let each = target
                    .checked_div(Decimal::from(buckets.len()))
                    .unwrap_or(Decimal::ZERO);
                for bucket in buckets.iter_mut() {
                    bucket.sum_value = each;
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileStrategy::Scale => "scale",
            ReconcileStrategy::WeightProportional => "weight_proportional",
            ReconcileStrategy::EqualSpread => "equal_spread",
        }
    }
}

pub fn total_value(buckets: &[Bucket]) -> Decimal {
    buckets
        .iter()
        .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.sum_value))
}

pub fn total_weight(buckets: &[Bucket]) -> Decimal {
    buckets
        .iter()
        .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.sum_weight.abs()))
}

/// `part * target / whole`, multiplying first to keep precision.
fn share(part: Decimal, target: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_mul(target)
        .and_then(|n| n.checked_div(whole))
        .or_else(|| part.checked_div(whole).and_then(|r| r.checked_mul(target)))
        .unwrap_or(Decimal::ZERO)
}
