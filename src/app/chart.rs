use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{QueryGuard, TradingStats};
use crate::models::{PeriodSelector, RawRecord, ServerMetrics};
use crate::series::{normalize, normalize_snapshots, SeriesBuilder, SeriesRun};
use crate::source::{fetch_all_pages, ChartSource, PageLimits};

/// Which feed supplies the rows for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Paginated trade history, bucketed client-side.
    #[default]
    TradeHistory,
    /// Pre-aggregated rows carried by the metrics response; falls back to trade history.
    ServerMetrics,
    /// Balance snapshots, diffed into deltas.
    BalanceSnapshots,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStrategy::TradeHistory => "trade_history",
            FetchStrategy::ServerMetrics => "server_metrics",
            FetchStrategy::BalanceSnapshots => "balance_snapshots",
        }
    }
}

impl FromStr for FetchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "trade_history" | "history" | "trades" => Ok(FetchStrategy::TradeHistory),
            "server_metrics" | "metrics" => Ok(FetchStrategy::ServerMetrics),
            "balance_snapshots" | "snapshots" => Ok(FetchStrategy::BalanceSnapshots),
            other => anyhow::bail!(
                "Invalid fetch strategy: {other}. Expected trade_history, server_metrics, or balance_snapshots."
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartQuery {
    pub selector: PeriodSelector,
    pub strategy: FetchStrategy,
    /// Balance before the first snapshot; only used by `BalanceSnapshots`.
    pub opening_balance: Option<Decimal>,
}

impl ChartQuery {
    pub fn new(selector: PeriodSelector) -> Self {
        Self {
            selector,
            strategy: FetchStrategy::default(),
            opening_balance: None,
        }
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_opening_balance(mut self, opening_balance: Option<Decimal>) -> Self {
        self.opening_balance = opening_balance;
        self
    }
}

/// Everything one chart query produced.
#[derive(Debug, Clone)]
pub struct ChartResult {
    pub query: ChartQuery,
    pub metrics: ServerMetrics,
    pub run: SeriesRun,
    pub stats: TradingStats,
    pub rows_fetched: usize,
}

enum Rows {
    Trades(Vec<RawRecord>),
    Snapshots(Vec<RawRecord>),
}

/// Fetches metrics and rows for a query and runs them through the series pipeline.
pub struct ChartService {
    source: Arc<dyn ChartSource>,
    builder: SeriesBuilder,
    limits: PageLimits,
    guard: QueryGuard,
}

impl ChartService {
    pub fn new(source: Arc<dyn ChartSource>, builder: SeriesBuilder) -> Self {
        Self {
            source,
            builder,
            limits: PageLimits::default(),
            guard: QueryGuard::new(),
        }
    }

    pub fn with_page_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_guard(mut self, guard: QueryGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &QueryGuard {
        &self.guard
    }

    pub fn builder(&self) -> &SeriesBuilder {
        &self.builder
    }

    async fn fetch_metrics(&self, selector: &PeriodSelector) -> Result<ServerMetrics> {
        self.source
            .fetch_metrics(selector)
            .await
            .with_context(|| format!("Failed to fetch metrics from {}", self.source.name()))
    }

    async fn fetch_rows(&self, query: &ChartQuery) -> Result<(ServerMetrics, Rows)> {
        let source = self.source.as_ref();
        let selector = &query.selector;

        match query.strategy {
            FetchStrategy::TradeHistory => {
                // Metrics first: their row count bounds the page walk.
                let metrics = self.fetch_metrics(selector).await?;
                let limits = self.limits.with_expected_rows(metrics.expected_rows());
                let rows = fetch_all_pages(source, &limits).await?;
                Ok((metrics, Rows::Trades(rows)))
            }
            FetchStrategy::ServerMetrics => {
                let metrics = self.fetch_metrics(selector).await?;
                let rows = match &metrics.buckets {
                    Some(buckets) => buckets.clone(),
                    None => {
                        info!(
                            source = source.name(),
                            %selector,
                            "Metrics carry no pre-aggregated buckets; falling back to trade history"
                        );
                        let limits = self.limits.with_expected_rows(metrics.expected_rows());
                        fetch_all_pages(source, &limits).await?
                    }
                };
                Ok((metrics, Rows::Trades(rows)))
            }
            FetchStrategy::BalanceSnapshots => {
                let (metrics, snapshots) = tokio::join!(
                    self.fetch_metrics(selector),
                    source.fetch_balance_snapshots(selector)
                );
                let snapshots = snapshots.with_context(|| {
                    format!("Failed to fetch balance snapshots from {}", source.name())
                })?;
                Ok((metrics?, Rows::Snapshots(snapshots)))
            }
        }
    }

    /// Run one query to completion.
    pub async fn run(&self, query: &ChartQuery) -> Result<ChartResult> {
        let (metrics, rows) = self.fetch_rows(query).await?;
        let calendar = self.builder.calendar();

        let (records, stats, rows_fetched) = match &rows {
            Rows::Trades(rows) => (
                normalize(rows, calendar),
                TradingStats::compute(rows, &metrics),
                rows.len(),
            ),
            Rows::Snapshots(rows) => (
                normalize_snapshots(rows, calendar, query.opening_balance),
                TradingStats::compute(&[], &metrics),
                rows.len(),
            ),
        };

        let run = self.builder.build(&records, metrics.money_made, &query.selector);
        info!(
            selector = %query.selector,
            strategy = query.strategy.as_str(),
            rows = rows_fetched,
            records = records.len(),
            points = run.points.len(),
            reconciled = ?run.report.applied,
            "Chart query completed"
        );

        Ok(ChartResult {
            query: *query,
            metrics,
            run,
            stats,
            rows_fetched,
        })
    }

    /// Like [`ChartService::run`], but returns `Ok(None)` when the selection
    /// changed while the query was in flight.
    pub async fn run_guarded(&self, query: &ChartQuery) -> Result<Option<ChartResult>> {
        let ticket = self.guard.begin(query.selector);
        let result = self.run(query).await;
        if !ticket.is_current() {
            debug!(selector = %ticket.selector(), "Discarding stale chart result");
            return Ok(None);
        }
        result.map(Some)
    }
}
