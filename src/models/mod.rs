mod bucket;
mod metrics;
mod period;
mod point;
mod raw;
mod record;

pub use bucket::BucketKey;
pub use metrics::ServerMetrics;
pub use period::{PeriodSelector, SelectorError};
pub use point::SeriesPoint;
pub use raw::RawRecord;
pub use record::NormalizedRecord;
