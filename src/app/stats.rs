use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use crate::models::{RawRecord, ServerMetrics};
use crate::numeric::is_truthy;

/// Win/loss summary shown next to the chart.
///
/// Server totals win over counts computed from the fetched rows; buy/sell
/// splits are only ever counted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradingStats {
    pub total_orders: u64,
    pub buy_orders: u64,
    pub sell_orders: u64,
    pub wins: u64,
    pub losses: u64,
    /// Percent, 1 dp.
    pub win_rate_percent: Decimal,
    pub using_server_totals: bool,
}

fn text_eq(record: &RawRecord, key: &str, expected: &str) -> bool {
    record
        .first_text(&[key])
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
}

fn flag(record: &RawRecord, key: &str) -> bool {
    record.fields().get(key).is_some_and(is_truthy)
}

fn count_where(rows: &[RawRecord], pred: impl Fn(&RawRecord) -> bool) -> u64 {
    rows.iter().filter(|r| pred(*r)).count() as u64
}

fn round1(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// A server win rate may be a fraction (`0.62`) or a percent (`62`).
fn win_rate_from_server(rate: Decimal) -> Decimal {
    if rate >= Decimal::ZERO && rate <= Decimal::ONE {
        round1(rate * Decimal::ONE_HUNDRED)
    } else {
        round1(rate)
    }
}

impl TradingStats {
    pub fn compute(rows: &[RawRecord], metrics: &ServerMetrics) -> Self {
        let computed_total = rows.len() as u64;
        let buy_orders = count_where(rows, |r| text_eq(r, "side", "buy"));
        let sell_orders = count_where(rows, |r| text_eq(r, "side", "sell"));
        let computed_wins = count_where(rows, |r| {
            text_eq(r, "status", "win") || text_eq(r, "result", "win") || flag(r, "is_win")
        });
        let computed_losses = count_where(rows, |r| {
            text_eq(r, "status", "loss") || text_eq(r, "result", "loss") || flag(r, "is_loss")
        });

        let total_orders = metrics.total_trades.unwrap_or(computed_total);
        let wins = metrics.total_wins.unwrap_or(computed_wins);
        let losses = metrics.total_losses.unwrap_or(computed_losses);

        let win_rate_percent = match metrics.winrate_percent {
            Some(rate) => win_rate_from_server(rate),
            None if total_orders > 0 => round1(
                Decimal::from(wins) * Decimal::ONE_HUNDRED / Decimal::from(total_orders),
            ),
            None => Decimal::ZERO,
        };

        Self {
            total_orders,
            buy_orders,
            sell_orders,
            wins,
            losses,
            win_rate_percent,
            using_server_totals: metrics.total_trades.is_some()
                || metrics.total_wins.is_some()
                || metrics.total_losses.is_some(),
        }
    }
}
