use crate::config::ResolvedConfig;
use crate::format::decimal_precise;

/// JSON view of the resolved configuration. The token is reported as present or not, never shown.
pub fn config_output(config: &ResolvedConfig) -> serde_json::Value {
    serde_json::json!({
        "config_file": config.config_path.display().to_string(),
        "timezone": config.calendar.label(),
        "engine": {
            "tolerance": decimal_precise(config.tolerance),
            "default_period": config.default_period,
        },
        "fetch": {
            "strategy": config.fetch.strategy.as_str(),
            "page_size": config.fetch.page_size,
            "max_pages": config.fetch.max_pages,
        },
        "api": {
            "base_url": config.api.base_url,
            "token_env": config.api.token_env,
            "token_set": config.token.is_some(),
        }
    })
}
