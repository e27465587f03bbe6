//! Claude Code usage exporter library entry.
//!
//! This crate wires the usage API fetcher, the record flattener, the poll
//! loop, and the scrape endpoint around one shared `MetricsRegistry`. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod fetch;
pub mod obs;
pub mod ops;
pub mod poller;
pub mod publish;
pub mod router;
