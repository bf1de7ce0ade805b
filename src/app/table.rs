use std::fmt::Write;

use super::ChartResult;
use crate::config::DisplayConfig;
use crate::format::{bucket_label, format_money};

/// Plain-text rendering of a chart result for terminals.
pub fn render_table(result: &ChartResult, display: &DisplayConfig) -> String {
    let mut out = String::new();
    let run = &result.run;

    let _ = writeln!(out, "Period: {}  ({})", run.selector, result.query.strategy.as_str());
    match result.metrics.money_made {
        Some(total) => {
            let _ = writeln!(out, "Money made: {}", format_money(total, display));
        }
        None => {
            let _ = writeln!(out, "Money made: n/a");
        }
    }
    if let Some(strategy) = run.report.applied {
        let _ = writeln!(
            out,
            "Reconciled with {} (raw total {})",
            strategy.as_str(),
            format_money(run.report.raw_total, display)
        );
    }
    let _ = writeln!(out);

    let width = run
        .points
        .iter()
        .map(|p| bucket_label(&p.key).len())
        .max()
        .unwrap_or(0);
    for point in &run.points {
        let value = point
            .display_value
            .map(|v| format_money(v, display))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{:<width$}  {value:>14}", bucket_label(&point.key));
    }

    let stats = &result.stats;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Trades: {}  Buys: {}  Sells: {}  Wins: {}  Losses: {}  Win rate: {:.1}%",
        stats.total_orders,
        stats.buy_orders,
        stats.sell_orders,
        stats.wins,
        stats.losses,
        stats.win_rate_percent
    );
    out
}
