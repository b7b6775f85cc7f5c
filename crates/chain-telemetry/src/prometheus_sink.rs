//! A concrete implementation of the metrics sinks using the `prometheus` crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram, register_int_counter,
    register_int_counter_vec, Gauge, Histogram, IntCounter, IntCounterVec,
};

static ENDPOINT_HEALTHY_COUNT: OnceCell<Gauge> = OnceCell::new();
static ENDPOINT_HEALTH_CHECK_SECONDS: OnceCell<Histogram> = OnceCell::new();
static ENDPOINT_FAILOVER_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static EXECUTION_IN_FLIGHT: OnceCell<Gauge> = OnceCell::new();
static EXECUTION_STATUS_TRANSITIONS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static EXECUTION_ITEM_LATENCY_SECONDS: OnceCell<Histogram> = OnceCell::new();
static EXECUTION_CANCELLED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static LLM_COMPLETION_LATENCY_SECONDS: OnceCell<Histogram> = OnceCell::new();
static LLM_PLAN_EXTRACTION_FAILURES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// The `prometheus`-backed implementation of [`MetricsSink`].
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("prometheus sink not initialized: call chain_telemetry::prometheus_sink::install() first")
    };
}

impl EndpointMetricsSink for PrometheusSink {
    fn observe_health_check(&self, _endpoint: &str, duration_secs: f64, _healthy: bool) {
        get_metric!(ENDPOINT_HEALTH_CHECK_SECONDS).observe(duration_secs);
    }
    fn inc_failover(&self, _from_endpoint: &str, _to_endpoint: &str) {
        get_metric!(ENDPOINT_FAILOVER_TOTAL).inc();
    }
    fn set_healthy_endpoint_count(&self, count: u64) {
        get_metric!(ENDPOINT_HEALTHY_COUNT).set(count as f64);
    }
}

impl ExecutionMetricsSink for PrometheusSink {
    fn inc_status_transition(&self, status: &'static str) {
        get_metric!(EXECUTION_STATUS_TRANSITIONS_TOTAL)
            .with_label_values(&[status])
            .inc();
    }
    fn observe_item_latency(&self, duration_secs: f64) {
        get_metric!(EXECUTION_ITEM_LATENCY_SECONDS).observe(duration_secs);
    }
    fn inc_cancelled(&self) {
        get_metric!(EXECUTION_CANCELLED_TOTAL).inc();
    }
    fn set_in_flight_count(&self, count: u64) {
        get_metric!(EXECUTION_IN_FLIGHT).set(count as f64);
    }
}

impl LlmMetricsSink for PrometheusSink {
    fn observe_completion_latency(&self, duration_secs: f64) {
        get_metric!(LLM_COMPLETION_LATENCY_SECONDS).observe(duration_secs);
    }
    fn inc_plan_extraction_failure(&self) {
        get_metric!(LLM_PLAN_EXTRACTION_FAILURES_TOTAL).inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, subsystem: &'static str, code: &'static str) {
        get_metric!(ERRORS_TOTAL).with_label_values(&[subsystem, code]).inc();
    }
}

/// Registers all Prometheus collectors and returns a static reference to the sink.
/// Must be called exactly once, at startup, before any sink-using code runs.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    ENDPOINT_HEALTHY_COUNT
        .set(register_gauge!(
            "chainwright_endpoint_healthy_count",
            "Current number of endpoints marked healthy."
        )?)
        .expect("static already initialized");
    ENDPOINT_HEALTH_CHECK_SECONDS
        .set(register_histogram!(
            "chainwright_endpoint_health_check_seconds",
            "Latency of a single endpoint health check.",
            exponential_buckets(0.001, 2.0, 14)?
        )?)
        .expect("static already initialized");
    ENDPOINT_FAILOVER_TOTAL
        .set(register_int_counter!(
            "chainwright_endpoint_failover_total",
            "Total number of forced endpoint failovers."
        )?)
        .expect("static already initialized");
    EXECUTION_IN_FLIGHT
        .set(register_gauge!(
            "chainwright_execution_in_flight",
            "Current number of non-terminal execution items."
        )?)
        .expect("static already initialized");
    EXECUTION_STATUS_TRANSITIONS_TOTAL
        .set(register_int_counter_vec!(
            "chainwright_execution_status_transitions_total",
            "Total execution item status transitions, labeled by status entered.",
            &["status"]
        )?)
        .expect("static already initialized");
    EXECUTION_ITEM_LATENCY_SECONDS
        .set(register_histogram!(
            "chainwright_execution_item_latency_seconds",
            "Latency from an item entering Ready to reaching a terminal status.",
            exponential_buckets(0.05, 2.0, 16)?
        )?)
        .expect("static already initialized");
    EXECUTION_CANCELLED_TOTAL
        .set(register_int_counter!(
            "chainwright_execution_cancelled_total",
            "Total execution items that reached Cancelled."
        )?)
        .expect("static already initialized");
    LLM_COMPLETION_LATENCY_SECONDS
        .set(register_histogram!(
            "chainwright_llm_completion_latency_seconds",
            "Latency of a single LLM completion call.",
            exponential_buckets(0.1, 2.0, 14)?
        )?)
        .expect("static already initialized");
    LLM_PLAN_EXTRACTION_FAILURES_TOTAL
        .set(register_int_counter!(
            "chainwright_llm_plan_extraction_failures_total",
            "Total failures extracting a JSON plan from model output."
        )?)
        .expect("static already initialized");
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "chainwright_errors_total",
            "Total errors, categorized by subsystem and machine-readable code.",
            &["subsystem", "code"]
        )?)
        .expect("static already initialized");

    static SINK_INSTANCE: PrometheusSink = PrometheusSink;
    Ok(&SINK_INSTANCE)
}
