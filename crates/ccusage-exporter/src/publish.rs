//! Flatten usage records into the metrics registry.
//!
//! Every write is an absolute `set`: a series always holds the value from the
//! most recent record that carried its label set. Later records with the same
//! labels overwrite earlier ones.

use ccusage_core::usage::{resolve_identity, UsageRecord};

use crate::obs::MetricsRegistry;

/// Publish a batch of records. Infallible.
pub fn publish(metrics: &MetricsRegistry, records: &[UsageRecord]) {
    for record in records {
        publish_record(metrics, record);
    }
}

fn publish_record(m: &MetricsRegistry, r: &UsageRecord) {
    let email = resolve_identity(r);
    let labels = [email, r.customer_type.as_str(), r.terminal_type.as_str()];

    m.sessions.set(&labels, r.core.sessions as f64);
    m.lines_added.set(&labels, r.core.lines_added as f64);
    m.lines_removed.set(&labels, r.core.lines_removed as f64);
    m.commits.set(&labels, r.core.commits as f64);
    m.pull_requests.set(&labels, r.core.pull_requests as f64);

    for (tool, actions) in &r.tool_actions {
        let tool_labels = [email, tool.as_str()];
        m.tool_accepted.set(&tool_labels, actions.accepted as f64);
        m.tool_rejected.set(&tool_labels, actions.rejected as f64);
    }

    for mb in &r.model_breakdown {
        let model_labels = [email, mb.model.as_str()];
        m.tokens_input.set(&model_labels, mb.input_tokens as f64);
        m.tokens_output.set(&model_labels, mb.output_tokens as f64);
        m.tokens_cache_read.set(&model_labels, mb.cache_read_tokens as f64);
        m.tokens_cache_creation.set(&model_labels, mb.cache_creation_tokens as f64);
        m.estimated_cost_cents.set(&model_labels, mb.estimated_cost_cents);
    }
}
