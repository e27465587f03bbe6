//! Poll loop: fetch -> publish -> stamp health -> sleep.
//!
//! Each cycle tries today's date (UTC) first and falls back to yesterday
//! once when today comes back empty. The two days are never merged, and an
//! upstream failure looks the same as a day with no rows yet.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;

use crate::fetch::UsageSource;
use crate::obs::MetricsRegistry;
use crate::publish::publish;

/// Which day (if any) a cycle published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Today(usize),
    Yesterday(usize),
    Empty,
}

impl PollOutcome {
    /// Records published by the cycle.
    pub fn records(self) -> usize {
        match self {
            PollOutcome::Today(n) | PollOutcome::Yesterday(n) => n,
            PollOutcome::Empty => 0,
        }
    }
}

pub struct Poller {
    source: Arc<dyn UsageSource>,
    metrics: Arc<MetricsRegistry>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl Poller {
    pub fn new(
        source: Arc<dyn UsageSource>,
        metrics: Arc<MetricsRegistry>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            metrics,
            interval,
            shutdown,
        }
    }

    /// Run one cycle for the given "today".
    pub async fn poll_once(&self, today: NaiveDate) -> PollOutcome {
        tracing::info!(date = %today, "polling usage api");

        let outcome = match self.fetch_and_publish(today).await {
            0 => self.fallback(today).await,
            n => PollOutcome::Today(n),
        };

        self.metrics
            .last_poll_records
            .set(&[], outcome.records() as f64);
        self.metrics.last_poll_timestamp.set(&[], unix_now());
        outcome
    }

    async fn fallback(&self, today: NaiveDate) -> PollOutcome {
        let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
            tracing::warn!(date = %today, "no previous day to fall back to");
            return PollOutcome::Empty;
        };

        tracing::info!(date = %yesterday, "no data for today, trying yesterday");
        match self.fetch_and_publish(yesterday).await {
            0 => {
                tracing::warn!(today = %today, yesterday = %yesterday, "no data available for today or yesterday");
                PollOutcome::Empty
            }
            n => PollOutcome::Yesterday(n),
        }
    }

    async fn fetch_and_publish(&self, date: NaiveDate) -> usize {
        let records = self.source.fetch(date).await;
        if !records.is_empty() {
            publish(&self.metrics, &records);
        }
        records.len()
    }

    /// Poll forever until the shutdown token fires. The first cycle runs immediately.
    pub async fn run(self) {
        loop {
            let today = Utc::now().date_naive();
            let outcome = self.poll_once(today).await;
            tracing::debug!(?outcome, "poll cycle complete");

            if self.shutdown.is_cancelled() {
                break;
            }

            tracing::info!(secs = self.interval.as_secs(), "next poll scheduled");
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!("poller stopped");
    }
}

fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
