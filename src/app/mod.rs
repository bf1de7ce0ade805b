mod chart;
mod config;
mod guard;
mod stats;
mod table;
mod types;

pub use chart::{ChartQuery, ChartResult, ChartService, FetchStrategy};
pub use config::config_output;
pub use guard::{QueryGuard, QueryTicket};
pub use stats::TradingStats;
pub use table::render_table;
pub use types::{ChartOutput, PointOutput, ReconcileOutput, StatsOutput};
