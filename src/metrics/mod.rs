use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};
use std::time::Duration;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Use-case throughput, outcome and latency
// - Stock units reserved / released and insufficient-stock rejections
// - Retries of transient storage failures
// - Domain event delivery
//
// All metrics are registered with Prometheus and scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Use-case Metrics
    pub operations_total: IntCounterVec,
    pub operation_duration: HistogramVec,

    // Stock Ledger Metrics
    pub stock_units_reserved: IntCounter,
    pub stock_units_released: IntCounter,
    pub insufficient_stock_total: IntCounter,

    // Retry Metrics
    pub retry_attempts_total: IntCounterVec,

    // Event Metrics
    pub events_published_total: IntCounterVec,
    pub event_sink_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Use-case Metrics
        let operations_total = IntCounterVec::new(
            Opts::new("commerce_operations_total", "Use-case invocations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("commerce_operation_duration_seconds", "Use-case latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        // Stock Ledger Metrics
        let stock_units_reserved = IntCounter::new(
            "stock_units_reserved_total",
            "Stock units taken out of inventory by reservations",
        )?;
        registry.register(Box::new(stock_units_reserved.clone()))?;

        let stock_units_released = IntCounter::new(
            "stock_units_released_total",
            "Stock units returned to inventory by releases and restocks",
        )?;
        registry.register(Box::new(stock_units_released.clone()))?;

        let insufficient_stock_total = IntCounter::new(
            "insufficient_stock_total",
            "Reservations rejected for lack of stock",
        )?;
        registry.register(Box::new(insufficient_stock_total.clone()))?;

        // Retry Metrics
        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Use-case retries after transient failures"),
            &["operation"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        // Event Metrics
        let events_published_total = IntCounterVec::new(
            Opts::new("events_published_total", "Domain events dispatched after commit"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_published_total.clone()))?;

        let event_sink_failures = IntCounterVec::new(
            Opts::new("event_sink_failures_total", "Event sink invocations that failed"),
            &["event_type", "sink"],
        )?;
        registry.register(Box::new(event_sink_failures.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            operation_duration,
            stock_units_reserved,
            stock_units_released,
            insufficient_stock_total,
            retry_attempts_total,
            events_published_total,
            event_sink_failures,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `outcome` is `success` or the error code.
    pub fn record_operation(&self, operation: &str, outcome: &str, elapsed: Duration) {
        self.operations_total.with_label_values(&[operation, outcome]).inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_reserved(&self, units: u64) {
        self.stock_units_reserved.inc_by(units);
    }

    pub fn record_released(&self, units: u64) {
        self.stock_units_released.inc_by(units);
    }

    pub fn record_insufficient_stock(&self) {
        self.insufficient_stock_total.inc();
    }

    pub fn record_retry_attempt(&self, operation: &str) {
        self.retry_attempts_total.with_label_values(&[operation]).inc();
    }

    pub fn record_event_published(&self, event_type: &str) {
        self.events_published_total.with_label_values(&[event_type]).inc();
    }

    pub fn record_event_failure(&self, event_type: &str, sink: &str) {
        self.event_sink_failures.with_label_values(&[event_type, sink]).inc();
    }
}
