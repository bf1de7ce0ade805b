use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A record reduced to what the series engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub timestamp: DateTime<Utc>,
    /// Contribution to profit, full precision, may be negative.
    pub value: Decimal,
    /// Non-negative redistribution key (trade notional), never used as profit.
    pub weight: Decimal,
}

impl NormalizedRecord {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal, weight: Decimal) -> Self {
        Self {
            timestamp,
            value,
            weight: weight.abs(),
        }
    }
}
