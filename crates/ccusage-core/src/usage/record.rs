//! Typed usage records.
//!
//! Built only through `wire`, so every field here already carries its
//! default ("unknown" or 0).

use std::collections::BTreeMap;

use super::{API_KEY_UNKNOWN, UNKNOWN};

/// Who a usage record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    /// A human user, identified by email.
    User { email: Option<String> },
    /// A programmatic caller, identified by API key name.
    ApiKey { name: Option<String> },
    /// Missing or unrecognized actor.
    #[default]
    Unknown,
}

impl Actor {
    /// Display identity. Total: every actor maps to some string.
    pub fn identity(&self) -> &str {
        match self {
            Actor::User { email } => email.as_deref().unwrap_or(UNKNOWN),
            Actor::ApiKey { name } => name.as_deref().unwrap_or(API_KEY_UNKNOWN),
            Actor::Unknown => UNKNOWN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreMetrics {
    pub sessions: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub commits: u64,
    pub pull_requests: u64,
}

/// Accepted / rejected proposal counts for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolActions {
    pub accepted: u64,
    pub rejected: u64,
}

/// Per-model token and cost breakdown.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelUsageEntry {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_creation_tokens: u64,
    /// Estimated cost in cents.
    pub estimated_cost_cents: f64,
    /// Currency of the estimate, when reported. Not exported.
    pub cost_currency: Option<String>,
}

/// One day's usage for one actor / customer type / terminal type.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub actor: Actor,
    pub customer_type: String,
    pub terminal_type: String,
    pub core: CoreMetrics,
    pub tool_actions: BTreeMap<String, ToolActions>,
    pub model_breakdown: Vec<ModelUsageEntry>,
}

impl Default for UsageRecord {
    fn default() -> Self {
        Self {
            actor: Actor::Unknown,
            customer_type: UNKNOWN.to_string(),
            terminal_type: UNKNOWN.to_string(),
            core: CoreMetrics::default(),
            tool_actions: BTreeMap::new(),
            model_breakdown: Vec::new(),
        }
    }
}

impl UsageRecord {
    pub fn identity(&self) -> &str {
        self.actor.identity()
    }
}

/// Resolve the identity label of a record.
pub fn resolve_identity(record: &UsageRecord) -> &str {
    record.identity()
}
