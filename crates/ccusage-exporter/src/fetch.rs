//! Usage API fetcher.
//!
//! `fetch(date)` walks every page of the usage report for one day. Any failed
//! page (transport, non-2xx, undecodable body) ends pagination and the
//! records gathered so far are returned as-is. Callers cannot tell a partial
//! fetch from a short day.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use ccusage_core::error::{ExporterError, Result};
use ccusage_core::usage::{UsagePage, UsageRecord};

use crate::config::ExporterConfig;
use crate::obs::MetricsRegistry;

const USER_AGENT: &str = concat!("ccusage-exporter/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce one day's usage records.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Vec<UsageRecord>;
}

/// Client for the Claude Code usage report endpoint.
pub struct UsageApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_version: String,
    page_limit: u32,
    metrics: Arc<MetricsRegistry>,
}

impl UsageApiClient {
    pub fn new(cfg: &ExporterConfig, metrics: Arc<MetricsRegistry>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExporterError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.api_base.clone(),
            api_key: cfg.admin_api_key.clone(),
            api_version: cfg.api_version.clone(),
            page_limit: cfg.page_limit,
            metrics,
        })
    }

    async fn fetch_page(&self, date: &str, cursor: Option<&str>) -> Result<UsagePage> {
        let mut query: Vec<(&str, String)> = vec![
            ("starting_at", date.to_string()),
            ("limit", self.page_limit.to_string()),
        ];
        if let Some(c) = cursor {
            query.push(("page", c.to_string()));
        }

        let resp = self
            .http
            .get(&self.base_url)
            .header("anthropic-version", &self.api_version)
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| ExporterError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExporterError::Status(status.as_u16()));
        }

        resp.json::<UsagePage>()
            .await
            .map_err(|e| ExporterError::Decode(e.to_string()))
    }
}

#[async_trait]
impl UsageSource for UsageApiClient {
    async fn fetch(&self, date: NaiveDate) -> Vec<UsageRecord> {
        let date = date.format("%Y-%m-%d").to_string();
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            self.metrics.api_requests.inc(&[]);
            let page = match self.fetch_page(&date, cursor.as_deref()).await {
                Ok(p) => p,
                Err(e) => {
                    let kind = e.kind().as_str();
                    self.metrics.api_errors.inc(&[kind]);
                    tracing::error!(error = %e, kind, date = %date, fetched = records.len(), "usage api request failed");
                    break;
                }
            };

            let next = page.next_cursor().map(str::to_string);
            let batch = page.into_records();
            tracing::info!(
                count = batch.len(),
                date = %date,
                page = cursor.as_deref().unwrap_or("first"),
                "fetched usage records"
            );
            records.extend(batch);

            match next {
                Some(n) => cursor = Some(n),
                None => break,
            }
        }

        records
    }
}
