use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::app::FetchStrategy;
use crate::calendar::Calendar;
use crate::source::{
    PageLimits, DEFAULT_HISTORY_PATH, DEFAULT_MAX_PAGES, DEFAULT_METRICS_PATH, DEFAULT_PAGE_SIZE,
    DEFAULT_SNAPSHOTS_PATH,
};

fn default_timezone() -> String {
    "local".to_string()
}

/// Series engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reconciliation tolerance in currency units, as a decimal string.
    pub tolerance: String,

    /// Period used when the CLI is not given one (`today`, `7d`, `monthly`).
    pub default_period: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: "0.50".to_string(),
            default_period: "7d".to_string(),
        }
    }
}

/// How chart rows are fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub strategy: FetchStrategy,

    /// Rows requested per history page.
    pub page_size: u32,

    /// Hard cap on history pages per query.
    pub max_pages: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Dashboard API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Environment variable holding the bearer token.
    pub token_env: String,

    pub metrics_path: String,
    pub history_path: String,
    pub snapshots_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token_env: "PNLCHART_TOKEN".to_string(),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            history_path: DEFAULT_HISTORY_PATH.to_string(),
            snapshots_path: DEFAULT_SNAPSHOTS_PATH.to_string(),
        }
    }
}

/// Display formatting for tables. Does not affect JSON output or calculations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Optional currency symbol (e.g. "$").
    pub currency_symbol: Option<String>,

    /// Render values with thousands separators.
    pub currency_grouping: bool,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `local`, `UTC`, or an IANA zone name. Drives bucketing and naive timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    pub engine: EngineConfig,
    pub fetch: FetchConfig,
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            engine: EngineConfig::default(),
            fetch: FetchConfig::default(),
            api: ApiConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Loaded configuration with parsed values.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub calendar: Calendar,
    pub tolerance: Decimal,
    pub default_period: String,
    pub fetch: FetchConfig,
    pub api: ApiConfig,
    /// Bearer token read from `api.token_env`, if set and non-empty.
    pub token: Option<SecretString>,
    pub display: DisplayConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./pnlchart.toml` if it exists in current directory
/// 2. `<config dir>/pnlchart/pnlchart.toml` (e.g. `~/.config` on Linux)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("pnlchart.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("pnlchart").join("pnlchart.toml");
    }

    local_config
}

impl ResolvedConfig {
    /// Validate and parse `config`, reading the token through `env`.
    pub fn resolve(
        config: Config,
        config_path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let calendar = Calendar::parse(&config.timezone)
            .with_context(|| format!("Invalid timezone in {}", config_path.display()))?;

        let tolerance = Decimal::from_str(config.engine.tolerance.trim()).with_context(|| {
            format!("Invalid engine.tolerance: {:?}", config.engine.tolerance)
        })?;
        if tolerance.is_sign_negative() {
            anyhow::bail!("engine.tolerance must not be negative: {tolerance}");
        }
        if config.fetch.page_size == 0 {
            anyhow::bail!("fetch.page_size must be at least 1");
        }
        if config.fetch.max_pages == 0 {
            anyhow::bail!("fetch.max_pages must be at least 1");
        }

        let token = env(&config.api.token_env)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        Ok(Self {
            config_path: config_path.to_path_buf(),
            calendar,
            tolerance,
            default_period: config.engine.default_period,
            fetch: config.fetch,
            api: config.api,
            token,
            display: config.display,
        })
    }

    /// Load and resolve config from a file path, reading the token from the process environment.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)?;
        Self::resolve(config, config_path, |key| std::env::var(key).ok())
    }

    /// Like [`ResolvedConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;
        Self::resolve(config, config_path, |key| std::env::var(key).ok())
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            page_size: self.fetch.page_size,
            max_pages: self.fetch.max_pages,
            expected_rows: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() -> Result<()> {
        let resolved = ResolvedConfig::resolve(Config::default(), Path::new("pnlchart.toml"), no_env)?;
        assert_eq!(resolved.calendar, Calendar::Local);
        assert_eq!(resolved.tolerance, Decimal::new(50, 2));
        assert_eq!(resolved.default_period, "7d");
        assert_eq!(resolved.fetch.strategy, FetchStrategy::TradeHistory);
        assert_eq!(resolved.fetch.page_size, 50);
        assert_eq!(resolved.fetch.max_pages, 200);
        assert_eq!(resolved.api.metrics_path, "/api/v1/trades/metrics/");
        assert!(resolved.token.is_none());
        Ok(())
    }

    #[test]
    fn test_load_empty_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("pnlchart.toml");
        std::fs::File::create(&config_path)?;

        let config = Config::load(&config_path)?;
        assert_eq!(config.timezone, "local");
        assert_eq!(config.engine.tolerance, "0.50");

        Ok(())
    }

    #[test]
    fn test_load_full_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("pnlchart.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "timezone = \"America/New_York\"")?;
        writeln!(file, "[engine]")?;
        writeln!(file, "tolerance = \"0.05\"")?;
        writeln!(file, "default_period = \"today\"")?;
        writeln!(file, "[fetch]")?;
        writeln!(file, "strategy = \"balance_snapshots\"")?;
        writeln!(file, "page_size = 100")?;
        writeln!(file, "[api]")?;
        writeln!(file, "base_url = \"https://dash.example.com\"")?;
        writeln!(file, "token_env = \"DASH_TOKEN\"")?;
        writeln!(file, "[display]")?;
        writeln!(file, "currency_symbol = \"$\"")?;
        writeln!(file, "currency_grouping = true")?;

        let config = Config::load(&config_path)?;
        let resolved = ResolvedConfig::resolve(config, &config_path, |key| {
            (key == "DASH_TOKEN").then(|| " secret-token ".to_string())
        })?;

        assert_eq!(resolved.calendar, Calendar::parse("America/New_York")?);
        assert_eq!(resolved.tolerance, Decimal::new(5, 2));
        assert_eq!(resolved.default_period, "today");
        assert_eq!(resolved.fetch.strategy, FetchStrategy::BalanceSnapshots);
        assert_eq!(resolved.fetch.page_size, 100);
        assert_eq!(resolved.fetch.max_pages, 200);
        assert_eq!(resolved.api.base_url, "https://dash.example.com");
        assert_eq!(resolved.api.history_path, "/api/v1/trades/history");
        assert_eq!(
            resolved.token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("secret-token".to_string())
        );
        assert_eq!(resolved.display.currency_symbol.as_deref(), Some("$"));
        assert!(resolved.display.currency_grouping);

        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let path = Path::new("pnlchart.toml");

        let mut config = Config::default();
        config.engine.tolerance = "abc".to_string();
        assert!(ResolvedConfig::resolve(config, path, no_env).is_err());

        let mut config = Config::default();
        config.engine.tolerance = "-1".to_string();
        assert!(ResolvedConfig::resolve(config, path, no_env).is_err());

        let mut config = Config::default();
        config.timezone = "Mars/Olympus_Mons".to_string();
        assert!(ResolvedConfig::resolve(config, path, no_env).is_err());

        let mut config = Config::default();
        config.fetch.page_size = 0;
        assert!(ResolvedConfig::resolve(config, path, no_env).is_err());
    }

    #[test]
    fn test_blank_token_is_ignored() -> Result<()> {
        let resolved = ResolvedConfig::resolve(Config::default(), Path::new("x.toml"), |_| {
            Some("   ".to_string())
        })?;
        assert!(resolved.token.is_none());
        Ok(())
    }

    #[test]
    fn test_config_load_or_default_missing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("missing.toml");

        let config = Config::load_or_default(&config_path)?;
        assert_eq!(config.timezone, "local");
        assert_eq!(config.fetch.page_size, 50);

        Ok(())
    }

    #[test]
    fn test_unknown_strategy_fails_to_parse() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("pnlchart.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "[fetch]")?;
        writeln!(file, "strategy = \"carrier_pigeon\"")?;

        assert!(Config::load(&config_path).is_err());
        Ok(())
    }
}
