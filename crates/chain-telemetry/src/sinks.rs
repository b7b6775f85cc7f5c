//! Abstract traits for metrics reporting, decoupling subsystems from the backend.

use once_cell::sync::OnceCell;

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured endpoint metrics sink, or a no-op
/// sink if none has been installed.
pub fn endpoint_metrics() -> &'static dyn EndpointMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured execution metrics sink, or a no-op
/// sink if none has been installed.
pub fn execution_metrics() -> &'static dyn ExecutionMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured LLM metrics sink, or a no-op sink if
/// none has been installed.
pub fn llm_metrics() -> &'static dyn LlmMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured error metrics sink, or a no-op sink
/// if none has been installed.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// A sink for metrics related to the endpoint manager: health checks, ordering, and
/// failover.
pub trait EndpointMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of a single health check against one endpoint.
    fn observe_health_check(&self, endpoint: &str, duration_secs: f64, healthy: bool);
    /// Increments a counter each time an active session is forced to fail over.
    fn inc_failover(&self, from_endpoint: &str, to_endpoint: &str);
    /// Sets the gauge tracking how many endpoints are currently marked healthy.
    fn set_healthy_endpoint_count(&self, count: u64);
}
impl EndpointMetricsSink for NopSink {
    fn observe_health_check(&self, _endpoint: &str, _duration_secs: f64, _healthy: bool) {}
    fn inc_failover(&self, _from_endpoint: &str, _to_endpoint: &str) {}
    fn set_healthy_endpoint_count(&self, _count: u64) {}
}

/// A sink for metrics related to the execution array and executioner.
pub trait ExecutionMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter each time an item transitions status, labeled by the
    /// status it entered.
    fn inc_status_transition(&self, status: &'static str);
    /// Observes the end-to-end latency from an item entering `Ready` to reaching a
    /// terminal status.
    fn observe_item_latency(&self, duration_secs: f64);
    /// Increments a counter for items that reached `Cancelled`.
    fn inc_cancelled(&self);
    /// Sets the gauge tracking how many items are currently in-flight (non-terminal).
    fn set_in_flight_count(&self, count: u64);
}
impl ExecutionMetricsSink for NopSink {
    fn inc_status_transition(&self, _status: &'static str) {}
    fn observe_item_latency(&self, _duration_secs: f64) {}
    fn inc_cancelled(&self) {}
    fn set_in_flight_count(&self, _count: u64) {}
}

/// A sink for metrics related to resolving natural-language requests into plans.
pub trait LlmMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of one completion call.
    fn observe_completion_latency(&self, duration_secs: f64);
    /// Increments a counter each time a plan fails to extract from model output.
    fn inc_plan_extraction_failure(&self);
}
impl LlmMetricsSink for NopSink {
    fn observe_completion_latency(&self, _duration_secs: f64) {}
    fn inc_plan_extraction_failure(&self) {}
}

/// A sink for recording structured error metrics across all subsystems.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by subsystem and code.
    fn inc_error(&self, subsystem: &'static str, code: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _subsystem: &'static str, _code: &'static str) {}
}

/// A unified sink implementing all domain-specific traits, providing a single point
/// of implementation for a metrics backend like Prometheus.
pub trait MetricsSink:
    EndpointMetricsSink + ExecutionMetricsSink + LlmMetricsSink + ErrorMetricsSink
{
}

impl<T> MetricsSink for T where
    T: EndpointMetricsSink + ExecutionMetricsSink + LlmMetricsSink + ErrorMetricsSink
{
}
