use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pnlchart::app::{
    config_output, render_table, ChartOutput, ChartQuery, ChartResult, ChartService,
    FetchStrategy, StatsOutput,
};
use pnlchart::clock::{Clock, FixedClock, SystemClock};
use pnlchart::config::{default_config_path, ResolvedConfig};
use pnlchart::format::decimal_precise;
use pnlchart::models::PeriodSelector;
use pnlchart::numeric::parse_decimal_str;
use pnlchart::series::SeriesBuilder;
use pnlchart::source::{ApiPaths, ChartSource, HttpSource, MemorySource};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pnlchart")]
#[command(about = "Gap-filled, reconciled balance and P&L charts for trading dashboards")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show resolved configuration
    Config,
    /// Build a chart series
    Chart(ChartArgs),
    /// Show trading statistics for a period
    Stats(ChartArgs),
}

#[derive(Args)]
struct ChartArgs {
    /// Period: today, <N>d (e.g. 7d), or monthly. Defaults to engine.default_period
    #[arg(short, long)]
    period: Option<String>,

    /// Year for a monthly period (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,

    /// Month (1-12) for a monthly period (defaults to the current month)
    #[arg(long)]
    month: Option<u32>,

    /// Row feed: trade_history, server_metrics, or balance_snapshots
    #[arg(long, value_parser = parse_strategy_arg)]
    strategy: Option<FetchStrategy>,

    /// Read trade history from a JSON file instead of the API
    #[arg(long, value_name = "FILE")]
    rows: Option<PathBuf>,

    /// Read the metrics object from a JSON file instead of the API
    #[arg(long, value_name = "FILE")]
    metrics: Option<PathBuf>,

    /// Read balance snapshots from a JSON file instead of the API
    #[arg(long, value_name = "FILE")]
    snapshots: Option<PathBuf>,

    /// Balance before the first snapshot (balance_snapshots only)
    #[arg(long, value_parser = parse_decimal_arg)]
    opening_balance: Option<Decimal>,

    /// Pin "now" to an RFC 3339 timestamp
    #[arg(long, value_name = "TIMESTAMP")]
    now: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

fn parse_strategy_arg(s: &str) -> Result<FetchStrategy, String> {
    s.parse::<FetchStrategy>().map_err(|e| e.to_string())
}

fn parse_decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal_str(s).ok_or_else(|| format!("Invalid decimal: {s}"))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn build_source(args: &ChartArgs, config: &mut ResolvedConfig) -> Result<Arc<dyn ChartSource>> {
    if args.rows.is_some() || args.metrics.is_some() || args.snapshots.is_some() {
        let load = |path: &Option<PathBuf>| path.as_deref().map(read_json).transpose();
        let source = MemorySource::from_json(load(&args.rows)?, load(&args.metrics)?, load(&args.snapshots)?);
        return Ok(Arc::new(source));
    }

    let source = HttpSource::new(config.api.base_url.clone())
        .with_paths(ApiPaths {
            metrics: config.api.metrics_path.clone(),
            history: config.api.history_path.clone(),
            snapshots: config.api.snapshots_path.clone(),
        })
        .with_token(config.token.take());
    Ok(Arc::new(source))
}

async fn run_chart(args: &ChartArgs, config: &mut ResolvedConfig) -> Result<ChartResult> {
    let clock: Arc<dyn Clock> = match &args.now {
        Some(now) => Arc::new(FixedClock::parse(now)?),
        None => Arc::new(SystemClock),
    };

    let period = args.period.clone().unwrap_or_else(|| config.default_period.clone());
    let today = config.calendar.date_of(clock.now());
    let selector = PeriodSelector::parse(&period, args.year, args.month, today)?;

    let source = build_source(args, config)?;
    let builder = SeriesBuilder::new(config.calendar)
        .with_tolerance(config.tolerance)
        .with_clock(clock);
    let service = ChartService::new(source, builder).with_page_limits(config.page_limits());

    let query = ChartQuery::new(selector)
        .with_strategy(args.strategy.unwrap_or(config.fetch.strategy))
        .with_opening_balance(args.opening_balance);
    service.run(&query).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = ResolvedConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load pnlchart config: {}", cli.config.display()))?;

    match cli.command {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config_output(&config))?);
        }
        Command::Chart(args) => {
            let result = run_chart(&args, &mut config).await?;
            match args.format {
                OutputFormat::Json => {
                    let output = ChartOutput::new(&result, &config.calendar);
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Table => print!("{}", render_table(&result, &config.display)),
            }
        }
        Command::Stats(args) => {
            let result = run_chart(&args, &mut config).await?;
            let output = StatsOutput::new(
                &result.stats,
                result.metrics.in_trade,
                result.metrics.accumulated_r.map(decimal_precise),
            );
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
