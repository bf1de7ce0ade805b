//! The series engine: normalize, plan, aggregate, reconcile, finalize.
//!
//! Everything here is synchronous and free of I/O; the wall clock is only
//! read through the injected [`Clock`](crate::clock::Clock).

mod aggregate;
mod builder;
mod finalize;
mod normalize;
mod planner;
mod reconcile;

pub use aggregate::{aggregate, Aggregation, Bucket, ReconcileReport};
pub use builder::{SeriesBuilder, SeriesRun, DEFAULT_TOLERANCE};
pub use finalize::{empty_series, finalize};
pub use normalize::{normalize, normalize_snapshots, normalize_trade, parse_timestamp};
pub use planner::{bucket_for, days_in_month, plan_buckets};
pub use reconcile::{total_value, total_weight, ReconcileStrategy, NEGLIGIBLE};
