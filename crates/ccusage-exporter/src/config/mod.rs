//! Exporter config loader.
//!
//! Environment first: the admin key, port, and poll interval come from the
//! environment. An optional YAML file (`EXPORTER_CONFIG`) carries the rest and
//! is parsed strictly; environment values override it.

pub mod schema;

use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use ccusage_core::error::{ExporterError, Result};

pub use schema::{ApiSection, ExporterConfig, ExporterSection};

pub const ENV_ADMIN_API_KEY: &str = "ANTHROPIC_ADMIN_API_KEY";
pub const ENV_PORT: &str = "EXPORTER_PORT";
pub const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL_SEC";
pub const ENV_CONFIG_FILE: &str = "EXPORTER_CONFIG";

/// Load from the process environment.
pub fn load_from_env() -> Result<ExporterConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Load using an arbitrary variable lookup.
pub fn load_with<F>(lookup: F) -> Result<ExporterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut section = match lookup(ENV_CONFIG_FILE) {
        Some(path) => load_from_file(&path)?,
        None => ExporterSection::default(),
    };

    if let Some(port) = lookup(ENV_PORT) {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| ExporterError::Config(format!("{ENV_PORT} must be a port number: {e}")))?;
        let mut addr: SocketAddr = section
            .listen
            .parse()
            .map_err(|e| ExporterError::Config(format!("listen must be a valid SocketAddr: {e}")))?;
        addr.set_port(port);
        section.listen = addr.to_string();
    }

    if let Some(secs) = lookup(ENV_POLL_INTERVAL) {
        section.poll_interval_secs = secs.trim().parse().map_err(|e| {
            ExporterError::Config(format!("{ENV_POLL_INTERVAL} must be a number of seconds: {e}"))
        })?;
    }

    let admin_api_key = lookup(ENV_ADMIN_API_KEY)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ExporterError::Config(format!("{ENV_ADMIN_API_KEY} is required")))?;

    resolve(section, admin_api_key)
}

pub fn load_from_file(path: &str) -> Result<ExporterSection> {
    let s = fs::read_to_string(path)
        .map_err(|e| ExporterError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterSection> {
    let section: ExporterSection = serde_yaml::from_str(s)
        .map_err(|e| ExporterError::Config(format!("invalid yaml: {e}")))?;
    section.validate()?;
    Ok(section)
}

fn resolve(section: ExporterSection, admin_api_key: String) -> Result<ExporterConfig> {
    section.validate()?;
    let listen = section
        .listen
        .parse()
        .map_err(|e| ExporterError::Config(format!("listen must be a valid SocketAddr: {e}")))?;

    Ok(ExporterConfig {
        admin_api_key,
        listen,
        poll_interval: Duration::from_secs(section.poll_interval_secs),
        request_timeout: Duration::from_secs(section.request_timeout_secs),
        api_base: section.api.base_url,
        api_version: section.api.version,
        page_limit: section.api.page_limit,
    })
}
