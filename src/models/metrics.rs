use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::RawRecord;
use crate::numeric::is_truthy;

const MONEY_MADE_KEYS: &[&str] = &["money_made", "money", "profit_total"];
const TOTAL_TRADES_KEYS: &[&str] = &["total_trades", "count"];
const TOTAL_WINS_KEYS: &[&str] = &["total_wins", "wins"];
const TOTAL_LOSSES_KEYS: &[&str] = &["total_losses", "losses"];
const WINRATE_KEYS: &[&str] = &["winrate_percent", "win_rate", "winrate"];
const ACCUMULATED_R_KEYS: &[&str] = &["accumulated_r", "accumulatedR"];
const IN_TRADE_KEYS: &[&str] = &["inTrade", "in_trade", "active_trade"];
const BUCKET_KEYS: &[&str] = &["buckets", "series", "history", "chart"];

/// Aggregates reported by the metrics endpoint for one period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerMetrics {
    pub period: Option<String>,
    /// The authoritative total. `None` when the server did not report one.
    pub money_made: Option<Decimal>,
    pub total_trades: Option<u64>,
    pub total_wins: Option<u64>,
    pub total_losses: Option<u64>,
    pub winrate_percent: Option<Decimal>,
    pub accumulated_r: Option<Decimal>,
    pub in_trade: bool,
    /// Pre-aggregated per-bucket rows, when the server provides them.
    pub buckets: Option<Vec<RawRecord>>,
}

impl ServerMetrics {
    /// Build from the loosely-typed metrics payload.
    ///
    /// Each field takes the first alias that is present; a present but
    /// non-numeric value counts as unreported.
    pub fn from_value(value: &Value) -> Self {
        let record = RawRecord::from(value.clone());
        let count = |keys: &[&str]| {
            record
                .first_number(keys)
                .filter(|d| !d.is_sign_negative())
                .and_then(|d| d.trunc().to_u64())
        };

        let buckets = BUCKET_KEYS.iter().find_map(|k| match record.fields().get(*k) {
            Some(Value::Array(rows)) => Some(rows.iter().cloned().map(RawRecord::from).collect()),
            _ => None,
        });

        Self {
            period: record.first_text(&["period"]),
            money_made: record.first_number(MONEY_MADE_KEYS),
            total_trades: count(TOTAL_TRADES_KEYS),
            total_wins: count(TOTAL_WINS_KEYS),
            total_losses: count(TOTAL_LOSSES_KEYS),
            winrate_percent: record.first_number(WINRATE_KEYS),
            accumulated_r: record.first_number(ACCUMULATED_R_KEYS),
            in_trade: IN_TRADE_KEYS
                .iter()
                .filter_map(|k| record.fields().get(*k))
                .any(is_truthy),
            buckets,
        }
    }

    /// Row count to expect from trade history, when the server reported one.
    pub fn expected_rows(&self) -> Option<u64> {
        self.total_trades.filter(|n| *n > 0)
    }
}
