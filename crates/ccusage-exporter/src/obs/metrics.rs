//! Metrics registry for the exporter.
//!
//! Gauge and counter vectors with a fixed, ordered label schema, backed by
//! `DashMap`. Each series is one atomic cell, so a single `set` is atomic with
//! respect to a concurrent scrape; a scrape may still observe a poll that is
//! only partly applied. Series are never removed: a label set that disappears
//! upstream keeps its last value.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".to_string() } else { "-Inf".to_string() }
    } else {
        v.to_string()
    }
}

/// Render `name{l1="v1",...} value` lines for every series, sorted by labels.
fn render_series<I>(name: &str, label_names: &[&str], series: I, out: &mut String)
where
    I: Iterator<Item = (Vec<String>, String)>,
{
    let mut rows: Vec<(Vec<String>, String)> = series.collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, val) in rows {
        if key.is_empty() {
            let _ = writeln!(out, "{} {}", name, val);
            continue;
        }
        let label_str = label_names
            .iter()
            .zip(key.iter())
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}{{{}}} {}", name, label_str, val);
    }
}

fn label_key(name: &str, label_names: &[&str], labels: &[&str]) -> Option<Vec<String>> {
    if labels.len() != label_names.len() {
        tracing::warn!(
            metric = name,
            expected = label_names.len(),
            got = labels.len(),
            "label count mismatch; sample dropped"
        );
        return None;
    }
    Some(labels.iter().map(|v| v.to_string()).collect())
}

/// Latest-value gauge per label set. Values are `f64` stored as bits.
pub struct GaugeVec {
    name: &'static str,
    help: &'static str,
    label_names: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicU64>,
}

impl GaugeVec {
    pub fn new(name: &'static str, help: &'static str, label_names: &'static [&'static str]) -> Self {
        Self {
            name,
            help,
            label_names,
            map: DashMap::new(),
        }
    }

    /// Overwrite the value for one label set, creating the series on first use.
    pub fn set(&self, labels: &[&str], v: f64) {
        let Some(key) = label_key(self.name, self.label_names, labels) else { return; };
        if let Some(cell) = self.map.get(&key) {
            cell.store(v.to_bits(), Ordering::Relaxed);
            return;
        }
        self.map
            .entry(key)
            .or_insert_with(|| AtomicU64::new(0))
            .store(v.to_bits(), Ordering::Relaxed);
    }

    /// Current value for one label set, if it was ever set.
    pub fn get(&self, labels: &[&str]) -> Option<f64> {
        let key: Vec<String> = labels.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|r| f64::from_bits(r.value().load(Ordering::Relaxed)))
    }

    /// Number of distinct series.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(self.help));
        let _ = writeln!(out, "# TYPE {} gauge", self.name);
        let series = self.map.iter().map(|r| {
            let v = f64::from_bits(r.value().load(Ordering::Relaxed));
            (r.key().clone(), format_value(v))
        });
        render_series(self.name, self.label_names, series, out);
    }
}

/// Monotonic counter per label set.
pub struct CounterVec {
    name: &'static str,
    help: &'static str,
    label_names: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &'static str, help: &'static str, label_names: &'static [&'static str]) -> Self {
        Self {
            name,
            help,
            label_names,
            map: DashMap::new(),
        }
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[&str]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[&str], v: u64) {
        let Some(key) = label_key(self.name, self.label_names, labels) else { return; };
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[&str]) -> u64 {
        let key: Vec<String> = labels.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|r| r.value().load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(self.help));
        let _ = writeln!(out, "# TYPE {} counter", self.name);
        let series = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed).to_string()));
        render_series(self.name, self.label_names, series, out);
    }
}

pub const CORE_LABELS: &[&str] = &["user_email", "customer_type", "terminal_type"];
pub const TOOL_LABELS: &[&str] = &["user_email", "tool_name"];
pub const MODEL_LABELS: &[&str] = &["user_email", "model"];

/// Every metric the exporter publishes, owned in one place and shared via `Arc`
/// between the poll task (the only writer) and the scrape handler.
pub struct MetricsRegistry {
    // core metrics
    pub sessions: GaugeVec,
    pub lines_added: GaugeVec,
    pub lines_removed: GaugeVec,
    pub commits: GaugeVec,
    pub pull_requests: GaugeVec,

    // tool actions
    pub tool_accepted: GaugeVec,
    pub tool_rejected: GaugeVec,

    // per-model tokens & cost
    pub tokens_input: GaugeVec,
    pub tokens_output: GaugeVec,
    pub tokens_cache_read: GaugeVec,
    pub tokens_cache_creation: GaugeVec,
    pub estimated_cost_cents: GaugeVec,

    // exporter health
    pub last_poll_timestamp: GaugeVec,
    pub last_poll_records: GaugeVec,
    pub api_requests: CounterVec,
    pub api_errors: CounterVec,
    draining: AtomicBool,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            sessions: GaugeVec::new(
                "claude_code_sessions_total",
                "Number of Claude Code sessions",
                CORE_LABELS,
            ),
            lines_added: GaugeVec::new(
                "claude_code_lines_added_total",
                "Lines of code added by Claude Code",
                CORE_LABELS,
            ),
            lines_removed: GaugeVec::new(
                "claude_code_lines_removed_total",
                "Lines of code removed by Claude Code",
                CORE_LABELS,
            ),
            commits: GaugeVec::new(
                "claude_code_commits_total",
                "Commits created by Claude Code",
                CORE_LABELS,
            ),
            pull_requests: GaugeVec::new(
                "claude_code_pull_requests_total",
                "Pull requests created by Claude Code",
                CORE_LABELS,
            ),
            tool_accepted: GaugeVec::new(
                "claude_code_tool_accepted_total",
                "Tool proposals accepted",
                TOOL_LABELS,
            ),
            tool_rejected: GaugeVec::new(
                "claude_code_tool_rejected_total",
                "Tool proposals rejected",
                TOOL_LABELS,
            ),
            tokens_input: GaugeVec::new(
                "claude_code_tokens_input_total",
                "Input tokens by model",
                MODEL_LABELS,
            ),
            tokens_output: GaugeVec::new(
                "claude_code_tokens_output_total",
                "Output tokens by model",
                MODEL_LABELS,
            ),
            tokens_cache_read: GaugeVec::new(
                "claude_code_tokens_cache_read_total",
                "Cache read tokens by model",
                MODEL_LABELS,
            ),
            tokens_cache_creation: GaugeVec::new(
                "claude_code_tokens_cache_creation_total",
                "Cache creation tokens by model",
                MODEL_LABELS,
            ),
            estimated_cost_cents: GaugeVec::new(
                "claude_code_estimated_cost_cents",
                "Estimated cost in USD cents by model",
                MODEL_LABELS,
            ),
            last_poll_timestamp: GaugeVec::new(
                "claude_code_exporter_last_poll_timestamp",
                "Unix timestamp of the last API poll",
                &[],
            ),
            last_poll_records: GaugeVec::new(
                "claude_code_exporter_last_poll_records",
                "Number of records fetched in last poll",
                &[],
            ),
            api_requests: CounterVec::new(
                "claude_code_exporter_api_requests_total",
                "Usage API page requests issued",
                &[],
            ),
            api_errors: CounterVec::new(
                "claude_code_exporter_api_errors_total",
                "Usage API page requests that aborted pagination",
                &["kind"],
            ),
            draining: AtomicBool::new(false),
        }
    }

    /// Mark draining state.
    pub fn set_draining(&self) { self.draining.store(true, Ordering::Relaxed); }
    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool { self.draining.load(Ordering::Relaxed) }

    /// Whether at least one poll cycle has completed.
    pub fn has_polled(&self) -> bool {
        self.last_poll_timestamp.get(&[]).is_some()
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for g in [
            &self.sessions,
            &self.lines_added,
            &self.lines_removed,
            &self.commits,
            &self.pull_requests,
            &self.tool_accepted,
            &self.tool_rejected,
            &self.tokens_input,
            &self.tokens_output,
            &self.tokens_cache_read,
            &self.tokens_cache_creation,
            &self.estimated_cost_cents,
            &self.last_poll_timestamp,
            &self.last_poll_records,
        ] {
            g.render(&mut out);
        }
        self.api_requests.render(&mut out);
        self.api_errors.render(&mut out);

        let _ = writeln!(
            out,
            "# TYPE claude_code_exporter_draining gauge\nclaude_code_exporter_draining {}",
            if self.is_draining() { 1 } else { 0 }
        );
        out
    }
}
