use uuid::Uuid;

use crate::domain::shared::MoneyError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order {order_id} cannot be modified while {status}")]
    NotMutable { order_id: Uuid, status: OrderStatus },

    #[error("Order {order_id} cannot be cancelled because it is already {status}")]
    CannotBeCancelled { order_id: Uuid, status: OrderStatus },

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Item {item_id} not found on order {order_id}")]
    ItemNotFound { order_id: Uuid, item_id: Uuid },

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Order must have at least one item")]
    EmptyItems,

    #[error(transparent)]
    InvalidMoney(#[from] MoneyError),
}
