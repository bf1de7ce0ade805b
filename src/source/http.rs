//! Chart source backed by the trading dashboard's REST API.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::{
    extract_records, ChartSource, DEFAULT_HISTORY_PATH, DEFAULT_METRICS_PATH,
    DEFAULT_SNAPSHOTS_PATH,
};
use crate::models::{PeriodSelector, RawRecord, ServerMetrics};

/// Endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPaths {
    pub metrics: String,
    pub history: String,
    pub snapshots: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            metrics: DEFAULT_METRICS_PATH.to_string(),
            history: DEFAULT_HISTORY_PATH.to_string(),
            snapshots: DEFAULT_SNAPSHOTS_PATH.to_string(),
        }
    }
}

/// Plain request/response adapter: no retries, no token refresh.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    paths: ApiPaths,
    token: Option<SecretString>,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            paths: ApiPaths::default(),
            token: None,
        }
    }

    pub fn with_paths(mut self, paths: ApiPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn period_query(selector: &PeriodSelector) -> Vec<(&'static str, String)> {
        let mut query = vec![("period", selector.metrics_period())];
        if let PeriodSelector::Monthly { year, month } = selector {
            query.push(("year", year.to_string()));
            query.push(("month", month.to_string()));
        }
        query
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }
        let body = request
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Request to {url} returned an error status"))?
            .json::<Value>()
            .await
            .with_context(|| format!("Response from {url} is not valid JSON"))?;
        Ok(body)
    }
}

#[async_trait::async_trait]
impl ChartSource for HttpSource {
    async fn fetch_metrics(&self, selector: &PeriodSelector) -> Result<ServerMetrics> {
        let body = self
            .get_json(&self.paths.metrics, &Self::period_query(selector))
            .await?;
        Ok(ServerMetrics::from_value(&body))
    }

    async fn fetch_history_page(&self, page: u32, page_size: u32) -> Result<Vec<RawRecord>> {
        let query = [("page", page.to_string()), ("page_size", page_size.to_string())];
        let body = self.get_json(&self.paths.history, &query).await?;
        Ok(extract_records(body))
    }

    async fn fetch_balance_snapshots(&self, selector: &PeriodSelector) -> Result<Vec<RawRecord>> {
        let body = self
            .get_json(&self.paths.snapshots, &Self::period_query(selector))
            .await?;
        Ok(extract_records(body))
    }

    fn name(&self) -> &str {
        "http"
    }
}
