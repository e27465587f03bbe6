//! Shared helpers for exporter integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{json, Value};

use ccusage_exporter::config::ExporterConfig;

pub const USAGE_PATH: &str = "/v1/organizations/usage_report/claude_code";
pub const TEST_KEY: &str = "sk-ant-admin-test";

pub fn test_config(server_uri: &str) -> ExporterConfig {
    ExporterConfig {
        admin_api_key: TEST_KEY.to_string(),
        listen: SocketAddr::from(([127, 0, 0, 1], 0)),
        poll_interval: Duration::from_secs(3600),
        request_timeout: Duration::from_secs(5),
        api_base: format!("{server_uri}{USAGE_PATH}"),
        api_version: "2023-06-01".to_string(),
        page_limit: 1000,
    }
}

/// A realistic record for `email`, with one tool and one model entry.
pub fn record(email: &str, sessions: u64) -> Value {
    json!({
        "date": "2025-09-01T00:00:00Z",
        "actor": { "type": "user_actor", "email_address": email },
        "organization_id": "org-test",
        "customer_type": "api",
        "terminal_type": "vscode",
        "core_metrics": {
            "num_sessions": sessions,
            "lines_of_code": { "added": 10, "removed": 4 },
            "commits_by_claude_code": 2,
            "pull_requests_by_claude_code": 1
        },
        "tool_actions": {
            "edit_tool": { "accepted": 7, "rejected": 1 }
        },
        "model_breakdown": [
            {
                "model": "claude-sonnet-4-5-20250929",
                "tokens": { "input": 1000, "output": 500, "cache_read": 200, "cache_creation": 100 },
                "estimated_cost": { "currency": "USD", "amount": 42 }
            }
        ]
    })
}

/// Records `user{start}..user{end}` in order.
pub fn records(start: usize, end: usize) -> Vec<Value> {
    (start..end)
        .map(|i| record(&format!("user{i}@example.com"), 1))
        .collect()
}

pub fn page_body(data: Vec<Value>, has_more: bool, next_page: Option<&str>) -> Value {
    json!({
        "data": data,
        "has_more": has_more,
        "next_page": next_page
    })
}
