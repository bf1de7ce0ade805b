use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::ChartSource;
use crate::models::RawRecord;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGES: u32 = 200;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page size must be at least 1")]
    ZeroPageSize,
    #[error("{source_name} returned too many history pages (>{max_pages}); aborting")]
    TooManyPages { source_name: String, max_pages: u32 },
}

/// Bounds for one paginated history fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub page_size: u32,
    pub max_pages: u32,
    /// Row count reported by the metrics, if any. Stops after `ceil(rows / page_size)` pages.
    pub expected_rows: Option<u64>,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            expected_rows: None,
        }
    }
}

impl PageLimits {
    pub fn with_expected_rows(mut self, expected_rows: Option<u64>) -> Self {
        self.expected_rows = expected_rows;
        self
    }
}

/// Fetch history pages sequentially until a terminator is hit.
///
/// Stops on a short (or empty) page, or once the page count implied by
/// `expected_rows` has been fetched. Running past `max_pages` is an error.
pub async fn fetch_all_pages<S: ChartSource + ?Sized>(
    source: &S,
    limits: &PageLimits,
) -> Result<Vec<RawRecord>> {
    if limits.page_size == 0 {
        return Err(PaginationError::ZeroPageSize.into());
    }
    let page_size = limits.page_size;
    let last_expected_page = limits
        .expected_rows
        .map(|rows| rows.div_ceil(u64::from(page_size)));

    let mut rows = Vec::new();
    for page in 1..=limits.max_pages {
        let batch = source
            .fetch_history_page(page, page_size)
            .await
            .with_context(|| format!("Failed to fetch history page {page} from {}", source.name()))?;
        let fetched = batch.len();
        rows.extend(batch);
        debug!(source = source.name(), page, fetched, total = rows.len(), "Fetched history page");

        let short_page = fetched < page_size as usize;
        let reached_expected = last_expected_page.is_some_and(|last| u64::from(page) >= last);
        if short_page || reached_expected {
            if let Some(expected) = limits.expected_rows {
                if rows.len() as u64 != expected {
                    warn!(
                        source = source.name(),
                        expected,
                        fetched = rows.len(),
                        "History row count differs from metrics total_trades"
                    );
                }
            }
            return Ok(rows);
        }
    }

    Err(PaginationError::TooManyPages {
        source_name: source.name().to_string(),
        max_pages: limits.max_pages,
    }
    .into())
}
