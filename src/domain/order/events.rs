use serde::{Deserialize, Serialize};

use super::aggregate::Order;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

/// Order Event - Union type for all order events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    StatusChanged(OrderStatusChanged),
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::Created(e) => &e.order,
            OrderEvent::StatusChanged(e) => &e.order,
            OrderEvent::Cancelled(e) => &e.order,
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Created - carries the order with its items loaded
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCreated {
    pub order: Order,
}

/// Order Status Changed - explicit status update, no stock movement
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderStatusChanged {
    pub order: Order,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
}

/// Order Cancelled - stock of every item has been released
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCancelled {
    pub order: Order,
    pub reason: String,
}
