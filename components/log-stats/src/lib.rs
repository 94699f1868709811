//! Streaming HTTP access log statistics.
//!
//! Lines flow `runtime` -> `parser` -> `metrics`, and `reporter` renders the
//! cumulative totals every few lines and once more when the stream ends.

/// Command line entry point
pub mod cli;
/// Errors, configuration and shutdown
pub mod helpers;
/// Diagnostics logging
pub mod instrumentation;
/// Running totals
pub mod metrics;
/// Line parsing
pub mod parser;
/// Snapshot rendering
pub mod reporter;
/// Stream driver
pub mod runtime;
/// Input sources
pub mod tailer;

pub use helpers::{errors::StatsError, load_config::Config, shutdown::Shutdown};
pub use metrics::metrics::Metrics;
pub use parser::parser::AccessLog;
pub use runtime::runtime::{DriverOptions, RunSummary, StreamDriver, Termination};
