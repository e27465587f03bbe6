//! Shared application state for the scrape server.
//!
//! The registry is the only thing the HTTP side needs; the poller holds its
//! own `Arc` to the same registry.

use std::sync::Arc;

use crate::obs::MetricsRegistry;

#[derive(Clone)]
pub struct AppState {
    metrics: Arc<MetricsRegistry>,
}

impl AppState {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Ready once the first poll cycle has stamped its timestamp.
    pub fn is_ready(&self) -> bool {
        self.metrics.has_polled()
    }
}
