//! Where chart rows and metrics come from.

mod envelope;
#[cfg(feature = "http")]
mod http;
mod memory;
mod paginate;

use anyhow::Result;

use crate::models::{PeriodSelector, RawRecord, ServerMetrics};

pub use envelope::extract_records;
#[cfg(feature = "http")]
pub use http::{ApiPaths, HttpSource};
pub use memory::MemorySource;
pub use paginate::{fetch_all_pages, PageLimits, PaginationError, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};

pub const DEFAULT_METRICS_PATH: &str = "/api/v1/trades/metrics/";
pub const DEFAULT_HISTORY_PATH: &str = "/api/v1/trades/history";
pub const DEFAULT_SNAPSHOTS_PATH: &str = "/api/v1/balance/snapshots";

/// A backend that can supply the metrics object and the row feeds for a chart.
///
/// History pages are 1-based.
#[async_trait::async_trait]
pub trait ChartSource: Send + Sync {
    async fn fetch_metrics(&self, selector: &PeriodSelector) -> Result<ServerMetrics>;

    async fn fetch_history_page(&self, page: u32, page_size: u32) -> Result<Vec<RawRecord>>;

    async fn fetch_balance_snapshots(&self, selector: &PeriodSelector) -> Result<Vec<RawRecord>>;

    fn name(&self) -> &str;
}
