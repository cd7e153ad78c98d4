use async_trait::async_trait;

use crate::domain::order::OrderEvent;
use crate::domain::product::ProductEvent;
use super::dispatcher::EventSink;
use super::envelope::{CommerceEvent, EventEnvelope};

// ============================================================================
// Event Sinks
// ============================================================================

/// Structured activity log of every committed change.
pub struct ActivityLogSink;

#[async_trait]
impl EventSink for ActivityLogSink {
    fn name(&self) -> &'static str {
        "activity_log"
    }

    async fn handle(&self, envelope: &EventEnvelope<CommerceEvent>) -> anyhow::Result<()> {
        match &envelope.event_data {
            CommerceEvent::Order(OrderEvent::Created(e)) => {
                tracing::info!(
                    order_id = %e.order.id,
                    order_number = %e.order.order_number,
                    customer_id = %e.order.customer_id,
                    total_amount = %e.order.total_amount,
                    item_count = e.order.items.len(),
                    "Order {} created", e.order.order_number
                );
            }
            CommerceEvent::Order(OrderEvent::StatusChanged(e)) => {
                tracing::info!(
                    order_id = %e.order.id,
                    previous_status = %e.previous_status,
                    new_status = %e.new_status,
                    "Order {} status changed", e.order.order_number
                );
            }
            CommerceEvent::Order(OrderEvent::Cancelled(e)) => {
                tracing::info!(
                    order_id = %e.order.id,
                    reason = %e.reason,
                    stock_restored = true,
                    "Order {} cancelled", e.order.order_number
                );
            }
            CommerceEvent::Product(ProductEvent::Created(e)) => {
                tracing::info!(
                    product_id = %e.product.id,
                    name = %e.product.name,
                    sku = %e.product.sku,
                    "Product {} created", e.product.id
                );
            }
            CommerceEvent::Product(ProductEvent::Updated(e)) => {
                tracing::info!(
                    product_id = %e.product.id,
                    name = %e.product.name,
                    changes = ?e.changes,
                    "Product {} updated", e.product.id
                );
            }
        }
        Ok(())
    }
}

/// Customer-facing notices. Delivery is a log line until a mailer exists.
pub struct CustomerNotificationSink;

#[async_trait]
impl EventSink for CustomerNotificationSink {
    fn name(&self) -> &'static str {
        "customer_notification"
    }

    async fn handle(&self, envelope: &EventEnvelope<CommerceEvent>) -> anyhow::Result<()> {
        let CommerceEvent::Order(event) = &envelope.event_data else {
            return Ok(());
        };

        match event {
            OrderEvent::Created(e) => {
                tracing::info!(
                    customer_id = %e.order.customer_id,
                    "Order confirmation sent for {}", e.order.order_number
                );
            }
            OrderEvent::StatusChanged(e) => {
                tracing::info!(
                    customer_id = %e.order.customer_id,
                    "Customer notified: Order {} is now {}", e.order.order_number, e.new_status.label()
                );
            }
            OrderEvent::Cancelled(e) => {
                tracing::info!(
                    customer_id = %e.order.customer_id,
                    "Cancellation notification sent for order {}", e.order.order_number
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingSink;

#[cfg(test)]
mod recording {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every envelope it receives, for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        envelopes: Mutex<Vec<EventEnvelope<CommerceEvent>>>,
    }

    impl RecordingSink {
        pub fn envelopes(&self) -> Vec<EventEnvelope<CommerceEvent>> {
            self.envelopes.lock().unwrap().clone()
        }

        pub fn event_types(&self) -> Vec<String> {
            self.envelopes()
                .into_iter()
                .map(|envelope| envelope.event_type)
                .collect()
        }

        pub fn len(&self) -> usize {
            self.envelopes.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn handle(&self, envelope: &EventEnvelope<CommerceEvent>) -> anyhow::Result<()> {
            self.envelopes.lock().unwrap().push(envelope.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Order, OrderStatus, OrderStatusChanged};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_log_sinks_accept_every_event() {
        let order = Order::new(Uuid::new_v4(), OrderStatus::Processing, None, "USD").unwrap();
        let envelope = EventEnvelope::new(
            CommerceEvent::Order(OrderEvent::StatusChanged(OrderStatusChanged {
                order,
                previous_status: OrderStatus::Pending,
                new_status: OrderStatus::Processing,
            })),
            Uuid::new_v4(),
        );

        assert!(ActivityLogSink.handle(&envelope).await.is_ok());
        assert!(CustomerNotificationSink.handle(&envelope).await.is_ok());
    }
}
