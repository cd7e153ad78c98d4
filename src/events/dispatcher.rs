use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::metrics::Metrics;
use super::envelope::{CommerceEvent, DomainEvent, EventEnvelope};

// ============================================================================
// Event Dispatcher - post-commit, fire-and-forget delivery
// ============================================================================
//
// Services hand committed events to the dispatcher, which passes each
// envelope to every registered sink in registration order. A failing sink
// is logged and counted; it never changes the outcome of the use case.
//
// ============================================================================

#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, envelope: &EventEnvelope<CommerceEvent>) -> anyhow::Result<()>;
}

pub struct EventDispatcher {
    sinks: Vec<Arc<dyn EventSink>>,
    metrics: Arc<Metrics>,
}

impl EventDispatcher {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            sinks: Vec::new(),
            metrics,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver events emitted by one use case, in order.
    pub async fn publish_all(&self, events: Vec<CommerceEvent>) {
        if events.is_empty() {
            return;
        }

        let correlation_id = Uuid::new_v4();
        for event in events {
            self.publish(EventEnvelope::new(event, correlation_id)).await;
        }
    }

    pub async fn publish(&self, envelope: EventEnvelope<CommerceEvent>) {
        tracing::debug!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            aggregate_id = %envelope.aggregate_id,
            correlation_id = %envelope.correlation_id,
            sinks = self.sinks.len(),
            "Dispatching domain event"
        );

        for sink in &self.sinks {
            if let Err(e) = sink.handle(&envelope).await {
                tracing::warn!(
                    sink = sink.name(),
                    event_type = %envelope.event_type,
                    aggregate_id = %envelope.aggregate_id,
                    error = %e,
                    "Event sink failed; continuing"
                );
                self.metrics
                    .record_event_failure(envelope.event_data.event_type(), sink.name());
            }
        }

        self.metrics.record_event_published(envelope.event_data.event_type());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Order, OrderCreated, OrderEvent, OrderStatus};
    use crate::events::RecordingSink;

    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn handle(&self, _envelope: &EventEnvelope<CommerceEvent>) -> anyhow::Result<()> {
            anyhow::bail!("sink unavailable")
        }
    }

    fn created_event() -> CommerceEvent {
        let order = Order::new(Uuid::new_v4(), OrderStatus::Pending, None, "USD").unwrap();
        OrderEvent::Created(OrderCreated { order }).into()
    }

    #[tokio::test]
    async fn test_publish_all_reaches_every_sink() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let first = Arc::new(RecordingSink::default());
        let second = Arc::new(RecordingSink::default());
        let dispatcher = EventDispatcher::new(metrics)
            .with_sink(first.clone())
            .with_sink(second.clone());

        dispatcher.publish_all(vec![created_event(), created_event()]).await;

        assert_eq!(first.event_types(), vec!["OrderCreated", "OrderCreated"]);
        assert_eq!(second.len(), 2);

        let envelopes = first.envelopes();
        assert_eq!(envelopes[0].correlation_id, envelopes[1].correlation_id);
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_delivery() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let recorder = Arc::new(RecordingSink::default());
        let dispatcher = EventDispatcher::new(metrics.clone())
            .with_sink(Arc::new(FailingSink))
            .with_sink(recorder.clone());

        dispatcher.publish_all(vec![created_event()]).await;

        assert_eq!(recorder.len(), 1);
        let gathered = metrics.registry().gather();
        let failures = gathered
            .iter()
            .find(|m| m.name() == "event_sink_failures_total")
            .unwrap();
        assert_eq!(failures.metric[0].counter.value, Some(1.0));
    }
}
