//! Scheduler: today/yesterday fallback and health bookkeeping.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use ccusage_core::usage::UsageRecord;
use ccusage_exporter::fetch::UsageSource;
use ccusage_exporter::obs::MetricsRegistry;
use ccusage_exporter::poller::{PollOutcome, Poller};
use ccusage_exporter::publish::publish;

mod common;

/// Canned records per date; remembers which dates were asked for.
#[derive(Default)]
struct FakeSource {
    days: HashMap<NaiveDate, Vec<UsageRecord>>,
    calls: Mutex<Vec<NaiveDate>>,
}

impl FakeSource {
    fn with_day(mut self, date: NaiveDate, n: usize) -> Self {
        let recs = (0..n)
            .map(|i| UsageRecord::from_value(common::record(&format!("{date}-{i}@example.com"), i as u64 + 1)))
            .collect();
        self.days.insert(date, recs);
        self
    }

    fn calls(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UsageSource for FakeSource {
    async fn fetch(&self, date: NaiveDate) -> Vec<UsageRecord> {
        self.calls.lock().unwrap().push(date);
        self.days.get(&date).cloned().unwrap_or_default()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn poller(source: Arc<FakeSource>, metrics: Arc<MetricsRegistry>) -> Poller {
    Poller::new(source, metrics, Duration::from_secs(3600), CancellationToken::new())
}

/// Render output without the health lines, for before/after comparison.
fn data_lines(m: &MetricsRegistry) -> Vec<String> {
    m.render()
        .lines()
        .filter(|l| !l.contains("claude_code_exporter_"))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn today_with_data_skips_yesterday() {
    let today = date(2025, 9, 2);
    let source = Arc::new(FakeSource::default().with_day(today, 3).with_day(date(2025, 9, 1), 5));
    let metrics = Arc::new(MetricsRegistry::new());

    let outcome = poller(Arc::clone(&source), Arc::clone(&metrics)).poll_once(today).await;

    assert_eq!(outcome, PollOutcome::Today(3));
    assert_eq!(source.calls(), vec![today]);
    assert_eq!(metrics.last_poll_records.get(&[]), Some(3.0));
    assert_eq!(metrics.sessions.len(), 3);
}

#[tokio::test]
async fn empty_today_falls_back_to_yesterday() {
    let today = date(2025, 9, 2);
    let yesterday = date(2025, 9, 1);
    let source = Arc::new(FakeSource::default().with_day(yesterday, 4));
    let metrics = Arc::new(MetricsRegistry::new());

    let outcome = poller(Arc::clone(&source), Arc::clone(&metrics)).poll_once(today).await;

    assert_eq!(outcome, PollOutcome::Yesterday(4));
    assert_eq!(source.calls(), vec![today, yesterday]);
    assert_eq!(metrics.last_poll_records.get(&[]), Some(4.0));

    let expected = MetricsRegistry::new();
    publish(&expected, &source.days[&yesterday]);
    assert_eq!(data_lines(&metrics), data_lines(&expected));
}

#[tokio::test]
async fn both_days_empty_records_zero_and_changes_nothing() {
    let today = date(2025, 9, 2);
    let source = Arc::new(FakeSource::default());
    let metrics = Arc::new(MetricsRegistry::new());
    publish(&metrics, &[UsageRecord::from_value(common::record("earlier@example.com", 8))]);
    metrics.last_poll_records.set(&[], 1.0);
    let before = data_lines(&metrics);

    let outcome = poller(Arc::clone(&source), Arc::clone(&metrics)).poll_once(today).await;

    assert_eq!(outcome, PollOutcome::Empty);
    assert_eq!(source.calls().len(), 2);
    assert_eq!(metrics.last_poll_records.get(&[]), Some(0.0));
    assert_eq!(data_lines(&metrics), before);
    assert!(metrics.has_polled());
}

#[tokio::test]
async fn fallback_crosses_month_boundary() {
    let today = date(2024, 3, 1);
    let source = Arc::new(FakeSource::default().with_day(date(2024, 2, 29), 1));
    let metrics = Arc::new(MetricsRegistry::new());

    let outcome = poller(Arc::clone(&source), metrics).poll_once(today).await;

    assert_eq!(outcome, PollOutcome::Yesterday(1));
    assert_eq!(source.calls(), vec![today, date(2024, 2, 29)]);
}

#[tokio::test]
async fn poll_stamps_timestamp() {
    let metrics = Arc::new(MetricsRegistry::new());
    assert!(!metrics.has_polled());

    let before = chrono::Utc::now().timestamp() as f64;
    poller(Arc::new(FakeSource::default()), Arc::clone(&metrics))
        .poll_once(date(2025, 9, 2))
        .await;

    let ts = metrics.last_poll_timestamp.get(&[]).unwrap();
    assert!(ts >= before);
}

#[tokio::test]
async fn run_stops_on_cancel() {
    let source = Arc::new(FakeSource::default());
    let metrics = Arc::new(MetricsRegistry::new());
    let token = CancellationToken::new();
    let poller = Poller::new(
        Arc::clone(&source) as Arc<dyn UsageSource>,
        Arc::clone(&metrics),
        Duration::from_secs(3600),
        token.clone(),
    );

    let task = tokio::spawn(poller.run());
    for _ in 0..200 {
        if metrics.has_polled() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(metrics.has_polled());

    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("poller must stop after cancel")
        .unwrap();

    // One cycle only: today, then yesterday.
    assert_eq!(source.calls().len(), 2);
}
