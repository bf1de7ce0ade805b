use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BucketKey;

/// One plotted point. Owned by the caller once the engine returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub key: BucketKey,
    pub label: String,
    /// Rounded to 2 dp. `None` only for the leading points of an empty intraday series.
    pub display_value: Option<Decimal>,
    /// Unrounded running (intraday) or per-bucket (daily) value.
    pub raw_precise: Option<Decimal>,
}

impl SeriesPoint {
    pub fn new(key: BucketKey, display_value: Option<Decimal>, raw_precise: Option<Decimal>) -> Self {
        Self {
            key,
            label: key.default_label(),
            display_value,
            raw_precise,
        }
    }
}
