use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use ccusage_core::error::{ExporterError, Result};

/// Non-secret settings, optionally read from a YAML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub api: ApiSection,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            api: ApiSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_api_base")]
    pub base_url: String,

    #[serde(default = "default_api_version")]
    pub version: String,

    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            version: default_api_version(),
            page_limit: default_page_limit(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            ExporterError::Config(format!("listen must be a valid SocketAddr ({}): {e}", self.listen))
        })?;
        if !(1..=86_400).contains(&self.poll_interval_secs) {
            return Err(ExporterError::Config(
                "poll_interval_secs must be between 1 and 86400".into(),
            ));
        }
        if !(1..=600).contains(&self.request_timeout_secs) {
            return Err(ExporterError::Config(
                "request_timeout_secs must be between 1 and 600".into(),
            ));
        }
        if !(1..=1000).contains(&self.api.page_limit) {
            return Err(ExporterError::Config(
                "api.page_limit must be between 1 and 1000".into(),
            ));
        }
        if self.api.base_url.is_empty() {
            return Err(ExporterError::Config("api.base_url must not be empty".into()));
        }
        Ok(())
    }
}

/// Fully resolved runtime configuration.
pub struct ExporterConfig {
    pub admin_api_key: String,
    pub listen: SocketAddr,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub api_base: String,
    pub api_version: String,
    pub page_limit: u32,
}

impl fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("admin_api_key", &"<redacted>")
            .field("listen", &self.listen)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

fn default_listen() -> String {
    "0.0.0.0:9101".into()
}
fn default_poll_interval_secs() -> u64 {
    3600
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_api_base() -> String {
    "https://api.anthropic.com/v1/organizations/usage_report/claude_code".into()
}
fn default_api_version() -> String {
    "2023-06-01".into()
}
fn default_page_limit() -> u32 {
    1000
}
