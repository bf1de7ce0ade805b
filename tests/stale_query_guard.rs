mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use pnlchart::app::{ChartQuery, ChartService};
use pnlchart::models::{PeriodSelector, ServerMetrics};
use pnlchart::source::MemorySource;
use serde_json::json;
use support::{trade_rows, utc_builder};

fn slow_source() -> Arc<MemorySource> {
    Arc::new(
        MemorySource::new()
            .with_history(trade_rows(3, "2026-10-19T09:00:00Z", "1"))
            .with_metrics(ServerMetrics::from_value(&json!({"money_made": 3})))
            .with_latency(Duration::from_millis(50)),
    )
}

#[tokio::test]
async fn current_query_is_returned() -> Result<()> {
    let service = ChartService::new(slow_source(), utc_builder());
    service.guard().select(PeriodSelector::Today);

    let result = service.run_guarded(&ChartQuery::new(PeriodSelector::Today)).await?;
    assert!(result.is_some());
    Ok(())
}

#[tokio::test]
async fn selection_change_mid_flight_discards_the_result() -> Result<()> {
    let service = Arc::new(ChartService::new(slow_source(), utc_builder()));
    service.guard().select(PeriodSelector::Today);

    let in_flight = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .run_guarded(&ChartQuery::new(PeriodSelector::Today))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    service.guard().select(PeriodSelector::LastDays { days: 7 });

    let stale = in_flight.await??;
    assert!(stale.is_none());

    let fresh = service
        .run_guarded(&ChartQuery::new(PeriodSelector::LastDays { days: 7 }))
        .await?;
    let fresh = fresh.expect("latest selection wins");
    assert_eq!(fresh.run.selector, PeriodSelector::LastDays { days: 7 });
    Ok(())
}

#[tokio::test]
async fn stale_failures_are_discarded_too() -> Result<()> {
    let source = Arc::new(
        MemorySource::new()
            .with_metrics_error("boom")
            .with_latency(Duration::from_millis(50)),
    );
    let service = Arc::new(ChartService::new(source, utc_builder()));

    let in_flight = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .run_guarded(&ChartQuery::new(PeriodSelector::Today))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    service.guard().select(PeriodSelector::Today);

    assert!(in_flight.await??.is_none());
    Ok(())
}
