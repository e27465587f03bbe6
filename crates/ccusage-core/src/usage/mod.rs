//! Claude Code usage report schema.
//!
//! Two layers:
//! - `wire`: the page envelope and raw, all-optional record shapes as the API
//!   sends them. Every field tolerates absence and wrong JSON types.
//! - `record`: typed records with every default already applied. Nothing
//!   downstream of this module looks up optional fields.

pub mod record;
pub mod wire;

pub use record::{resolve_identity, Actor, CoreMetrics, ModelUsageEntry, ToolActions, UsageRecord};
pub use wire::UsagePage;

/// Identity used when the actor (or its email) cannot be resolved.
pub const UNKNOWN: &str = "unknown";
/// Identity used for API-key actors without a key name.
pub const API_KEY_UNKNOWN: &str = "api_key_unknown";
