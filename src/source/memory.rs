use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use super::{extract_records, ChartSource};
use crate::models::{PeriodSelector, RawRecord, ServerMetrics};

/// In-memory source backed by fixed rows, for offline charts and tests.
///
/// The same metrics object is returned for every selector.
#[derive(Debug, Default)]
pub struct MemorySource {
    metrics: ServerMetrics,
    history: Vec<RawRecord>,
    snapshots: Vec<RawRecord>,
    latency: Option<Duration>,
    metrics_error: Option<String>,
    metrics_requests: AtomicUsize,
    history_requests: AtomicUsize,
    snapshot_requests: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw JSON bodies, as they would come off the wire.
    pub fn from_json(history: Option<Value>, metrics: Option<Value>, snapshots: Option<Value>) -> Self {
        Self {
            metrics: metrics
                .map(|m| ServerMetrics::from_value(&m))
                .unwrap_or_default(),
            history: history.map(extract_records).unwrap_or_default(),
            snapshots: snapshots.map(extract_records).unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn with_metrics(mut self, metrics: ServerMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_history(mut self, rows: Vec<RawRecord>) -> Self {
        self.history = rows;
        self
    }

    pub fn with_snapshots(mut self, rows: Vec<RawRecord>) -> Self {
        self.snapshots = rows;
        self
    }

    /// Delay every response, to exercise overlapping queries.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every metrics fetch fail with `message`.
    pub fn with_metrics_error(mut self, message: impl Into<String>) -> Self {
        self.metrics_error = Some(message.into());
        self
    }

    pub fn metrics_requests(&self) -> usize {
        self.metrics_requests.load(Ordering::SeqCst)
    }

    pub fn history_requests(&self) -> usize {
        self.history_requests.load(Ordering::SeqCst)
    }

    pub fn snapshot_requests(&self) -> usize {
        self.snapshot_requests.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl ChartSource for MemorySource {
    async fn fetch_metrics(&self, _selector: &PeriodSelector) -> Result<ServerMetrics> {
        self.metrics_requests.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        if let Some(message) = &self.metrics_error {
            anyhow::bail!("{message}");
        }
        Ok(self.metrics.clone())
    }

    async fn fetch_history_page(&self, page: u32, page_size: u32) -> Result<Vec<RawRecord>> {
        self.history_requests.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let start = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        Ok(self
            .history
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect())
    }

    async fn fetch_balance_snapshots(&self, _selector: &PeriodSelector) -> Result<Vec<RawRecord>> {
        self.snapshot_requests.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        Ok(self.snapshots.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
