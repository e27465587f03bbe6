//! ccusage core: the usage-report wire schema, typed records, and error types.
//!
//! This crate defines the data contract with the upstream usage API and the
//! error surface shared by the exporter. It carries no transport or runtime
//! dependencies so the decode rules can be tested in isolation.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed upstream records decode to default values instead of failing,
//! so one bad record never costs the rest of a poll.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod usage;

/// Shared result type.
pub use error::{ErrorKind, ExporterError, Result};
pub use usage::{Actor, CoreMetrics, ModelUsageEntry, ToolActions, UsagePage, UsageRecord};
