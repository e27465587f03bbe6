//! Wire shapes of the usage report endpoint.
//!
//! The page envelope is decoded strictly enough to paginate; records are kept
//! as raw JSON until `UsagePage::into_records`, where each one is decoded on
//! its own so a malformed record cannot fail the page.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use super::record::{Actor, CoreMetrics, ModelUsageEntry, ToolActions, UsageRecord};
use super::UNKNOWN;

/// One page of `GET /v1/organizations/usage_report/claude_code`.
#[derive(Debug, Default, Deserialize)]
pub struct UsagePage {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub has_more: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub next_page: Option<String>,
}

impl UsagePage {
    /// Cursor for the following page, if the server says there is one.
    ///
    /// Both `has_more` and a non-empty `next_page` are required.
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.has_more {
            return None;
        }
        self.next_page.as_deref().filter(|c| !c.is_empty())
    }

    /// Decode every record in page order. Never fails.
    pub fn into_records(self) -> Vec<UsageRecord> {
        self.data.into_iter().map(UsageRecord::from_value).collect()
    }
}

impl UsageRecord {
    /// Decode a single record, applying defaults for anything missing or malformed.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value::<RawRecord>(value)
            .unwrap_or_default()
            .into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    #[serde(deserialize_with = "lenient")]
    actor: Option<RawActor>,
    #[serde(deserialize_with = "lenient")]
    customer_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    terminal_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    core_metrics: Option<RawCoreMetrics>,
    #[serde(deserialize_with = "lenient")]
    tool_actions: BTreeMap<String, Value>,
    #[serde(deserialize_with = "lenient")]
    model_breakdown: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawActor {
    #[serde(rename = "type", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    email_address: Option<String>,
    #[serde(deserialize_with = "lenient")]
    api_key_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCoreMetrics {
    #[serde(deserialize_with = "count")]
    num_sessions: u64,
    #[serde(deserialize_with = "lenient")]
    lines_of_code: RawLinesOfCode,
    #[serde(deserialize_with = "count")]
    commits_by_claude_code: u64,
    #[serde(deserialize_with = "count")]
    pull_requests_by_claude_code: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLinesOfCode {
    #[serde(deserialize_with = "count")]
    added: u64,
    #[serde(deserialize_with = "count")]
    removed: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawToolAction {
    #[serde(deserialize_with = "count")]
    accepted: u64,
    #[serde(deserialize_with = "count")]
    rejected: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawModelEntry {
    #[serde(deserialize_with = "lenient")]
    model: Option<String>,
    #[serde(deserialize_with = "lenient")]
    tokens: RawTokens,
    #[serde(deserialize_with = "lenient")]
    estimated_cost: RawCost,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTokens {
    #[serde(deserialize_with = "count")]
    input: u64,
    #[serde(deserialize_with = "count")]
    output: u64,
    #[serde(deserialize_with = "count")]
    cache_read: u64,
    #[serde(deserialize_with = "count")]
    cache_creation: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCost {
    #[serde(deserialize_with = "amount")]
    amount: f64,
    #[serde(deserialize_with = "lenient")]
    currency: Option<String>,
}

impl From<RawActor> for Actor {
    fn from(raw: RawActor) -> Self {
        match raw.kind.as_deref() {
            Some("user_actor") => Actor::User {
                email: raw.email_address,
            },
            Some("api_actor") => Actor::ApiKey {
                name: raw.api_key_name,
            },
            _ => Actor::Unknown,
        }
    }
}

impl From<RawRecord> for UsageRecord {
    fn from(raw: RawRecord) -> Self {
        let core = raw.core_metrics.unwrap_or_default();
        let tool_actions = raw
            .tool_actions
            .into_iter()
            .map(|(tool, v)| {
                let t: RawToolAction = decode_or_default(v);
                (
                    tool,
                    ToolActions {
                        accepted: t.accepted,
                        rejected: t.rejected,
                    },
                )
            })
            .collect();
        let model_breakdown = raw
            .model_breakdown
            .into_iter()
            .map(|v| {
                let m: RawModelEntry = decode_or_default(v);
                ModelUsageEntry {
                    model: m.model.unwrap_or_else(|| UNKNOWN.to_string()),
                    input_tokens: m.tokens.input,
                    output_tokens: m.tokens.output,
                    cache_read_tokens: m.tokens.cache_read,
                    cache_creation_tokens: m.tokens.cache_creation,
                    estimated_cost_cents: m.estimated_cost.amount,
                    cost_currency: m.estimated_cost.currency,
                }
            })
            .collect();

        UsageRecord {
            actor: raw.actor.map(Actor::from).unwrap_or(Actor::Unknown),
            customer_type: raw.customer_type.unwrap_or_else(|| UNKNOWN.to_string()),
            terminal_type: raw.terminal_type.unwrap_or_else(|| UNKNOWN.to_string()),
            core: CoreMetrics {
                sessions: core.num_sessions,
                lines_added: core.lines_of_code.added,
                lines_removed: core.lines_of_code.removed,
                commits: core.commits_by_claude_code,
                pull_requests: core.pull_requests_by_claude_code,
            },
            tool_actions,
            model_breakdown,
        }
    }
}

fn decode_or_default<T: DeserializeOwned + Default>(v: Value) -> T {
    serde_json::from_value(v).unwrap_or_default()
}

/// Accept any JSON for a field; wrong shapes (and `null`) become `T::default()`.
fn lenient<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let v = Value::deserialize(d)?;
    Ok(decode_or_default(v))
}

/// Non-negative integer count. Floats truncate, numeric strings parse,
/// negatives and anything else become 0.
fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let v = Value::deserialize(d)?;
    if let Some(n) = v.as_u64() {
        return Ok(n);
    }
    Ok(number(&v).filter(|f| *f > 0.0).map(|f| f as u64).unwrap_or(0))
}

fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(number(&v).unwrap_or(0.0))
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn count_accepts_floats_and_numeric_strings() {
        let rec = UsageRecord::from_value(json!({
            "core_metrics": {
                "num_sessions": 3.9,
                "commits_by_claude_code": "7",
                "pull_requests_by_claude_code": -2,
                "lines_of_code": { "added": null, "removed": [1] }
            }
        }));
        assert_eq!(rec.core.sessions, 3);
        assert_eq!(rec.core.commits, 7);
        assert_eq!(rec.core.pull_requests, 0);
        assert_eq!(rec.core.lines_added, 0);
        assert_eq!(rec.core.lines_removed, 0);
    }

    #[test]
    fn next_cursor_requires_has_more_and_token() {
        let page: UsagePage =
            serde_json::from_value(json!({ "data": [], "has_more": true, "next_page": "" })).unwrap();
        assert_eq!(page.next_cursor(), None);

        let page: UsagePage =
            serde_json::from_value(json!({ "data": [], "has_more": false, "next_page": "p2" })).unwrap();
        assert_eq!(page.next_cursor(), None);

        let page: UsagePage =
            serde_json::from_value(json!({ "data": [], "has_more": true, "next_page": "p2" })).unwrap();
        assert_eq!(page.next_cursor(), Some("p2"));
    }

    #[test]
    fn page_tolerates_null_data() {
        let page: UsagePage =
            serde_json::from_value(json!({ "data": null, "has_more": null })).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.next_cursor(), None);
    }
}
