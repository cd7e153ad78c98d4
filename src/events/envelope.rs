use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::OrderEvent;
use crate::domain::product::ProductEvent;

// ============================================================================
// Event Envelope - event metadata
// ============================================================================
//
// Wraps a committed domain fact with identity, correlation and timing so
// sinks can log or forward it without knowing the aggregate internals.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,

    // Event Type Information
    pub event_type: String,

    // Event Payload
    pub event_data: E,

    // Groups every event emitted by one use-case invocation
    pub correlation_id: Uuid,

    // Timing
    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(event_data: E, correlation_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id: event_data.aggregate_id(),
            event_type: event_data.event_type().to_string(),
            event_data,
            correlation_id,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

pub trait DomainEvent: Serialize + Clone + Send + Sync {
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> Uuid;
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Created(_) => "OrderCreated",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::Cancelled(_) => "OrderCancelled",
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.order().id
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => "ProductCreated",
            ProductEvent::Updated(_) => "ProductUpdated",
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.product().id
    }
}

/// Every event the catalog can emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "event")]
pub enum CommerceEvent {
    Order(OrderEvent),
    Product(ProductEvent),
}

impl DomainEvent for CommerceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CommerceEvent::Order(e) => e.event_type(),
            CommerceEvent::Product(e) => e.event_type(),
        }
    }

    fn aggregate_id(&self) -> Uuid {
        match self {
            CommerceEvent::Order(e) => e.aggregate_id(),
            CommerceEvent::Product(e) => e.aggregate_id(),
        }
    }
}

impl From<OrderEvent> for CommerceEvent {
    fn from(event: OrderEvent) -> Self {
        CommerceEvent::Order(event)
    }
}

impl From<ProductEvent> for CommerceEvent {
    fn from(event: ProductEvent) -> Self {
        CommerceEvent::Product(event)
    }
}

// ============================================================================
// Tests
// ============================================================================
