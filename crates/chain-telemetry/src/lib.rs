#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Chainwright telemetry
//!
//! Observability infrastructure shared by every crate in the workspace: structured
//! JSON logging via `tracing`, a Prometheus metrics endpoint, and abstract sinks that
//! decouple subsystem instrumentation from the metrics backend.

/// A lightweight HTTP server exposing `/metrics` and `/healthz`.
pub mod http;
/// The initialization routine for global structured logging.
pub mod init;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus_sink;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// A simple RAII timer for measuring execution item latency.
pub mod time;

pub use init::init_tracing;
pub use sinks::{endpoint_metrics, error_metrics, execution_metrics, llm_metrics};
