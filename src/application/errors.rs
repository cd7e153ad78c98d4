use uuid::Uuid;

use crate::domain::order::{OrderError, OrderStatus};
use crate::domain::product::{ProductError, SkuError};
use crate::domain::shared::{MoneyError, QuantityError};
use crate::store::StoreError;
use crate::utils::IsTransient;

// ============================================================================
// Service Boundary Errors
// ============================================================================
//
// Every use case returns CommerceError. Domain enums fold into it; `code()`
// is the stable machine-readable identifier exposed over HTTP and used as
// the metrics outcome label.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommerceError {
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Order {0} not found")]
    OrderNotFound(Uuid),

    #[error("Item {item_id} not found on order {order_id}")]
    ItemNotFound { order_id: Uuid, item_id: Uuid },

    #[error("Insufficient stock for product {product_id}. Requested: {requested}, Available: {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Order {order_id} cannot be modified while {status}")]
    OrderNotMutable { order_id: Uuid, status: OrderStatus },

    #[error("Order {order_id} cannot be cancelled because it is already {status}")]
    OrderCannotBeCancelled { order_id: Uuid, status: OrderStatus },

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error(transparent)]
    InvalidMoney(#[from] MoneyError),

    #[error(transparent)]
    InvalidSku(#[from] SkuError),

    #[error("SKU {0} already exists")]
    DuplicateSku(String),

    #[error("Invalid order status: {0}")]
    InvalidOrderStatus(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Order must have at least one item")]
    EmptyOrder,

    #[error("{0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl CommerceError {
    pub fn code(&self) -> &'static str {
        match self {
            CommerceError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CommerceError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            CommerceError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            CommerceError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            CommerceError::OrderNotMutable { .. } => "ORDER_NOT_MUTABLE",
            CommerceError::OrderCannotBeCancelled { .. } => "ORDER_CANNOT_BE_CANCELLED",
            CommerceError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            CommerceError::InvalidMoney(_) => "INVALID_MONEY",
            CommerceError::InvalidSku(_) => "INVALID_SKU",
            CommerceError::DuplicateSku(_) => "DUPLICATE_SKU",
            CommerceError::InvalidOrderStatus(_) => "INVALID_ORDER_STATUS",
            CommerceError::InvalidQuantity(_) => "INVALID_QUANTITY",
            CommerceError::EmptyOrder => "EMPTY_ORDER",
            CommerceError::Validation(_) => "VALIDATION_ERROR",
            CommerceError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl IsTransient for CommerceError {
    fn is_transient(&self) -> bool {
        match self {
            CommerceError::Storage(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<QuantityError> for CommerceError {
    fn from(error: QuantityError) -> Self {
        CommerceError::InvalidQuantity(error.to_string())
    }
}

impl From<OrderError> for CommerceError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::NotMutable { order_id, status } => {
                CommerceError::OrderNotMutable { order_id, status }
            }
            OrderError::CannotBeCancelled { order_id, status } => {
                CommerceError::OrderCannotBeCancelled { order_id, status }
            }
            OrderError::InvalidStatusTransition { order_id, from, to } => {
                CommerceError::InvalidStatusTransition { order_id, from, to }
            }
            OrderError::ItemNotFound { order_id, item_id } => {
                CommerceError::ItemNotFound { order_id, item_id }
            }
            OrderError::InvalidStatus(label) => CommerceError::InvalidOrderStatus(label),
            OrderError::InvalidQuantity(quantity) => {
                CommerceError::InvalidQuantity(format!("item quantity must be at least 1 (got {quantity})"))
            }
            OrderError::EmptyItems => CommerceError::EmptyOrder,
            OrderError::InvalidMoney(e) => CommerceError::InvalidMoney(e),
        }
    }
}

impl From<ProductError> for CommerceError {
    fn from(error: ProductError) -> Self {
        match error {
            ProductError::InsufficientStock {
                product_id,
                requested,
                available,
            } => CommerceError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            ProductError::InvalidQuantity(e) => e.into(),
            ProductError::EmptyName => CommerceError::Validation("Product name cannot be empty".to_string()),
            ProductError::InvalidSku(e) => CommerceError::InvalidSku(e),
            ProductError::InvalidMoney(e) => CommerceError::InvalidMoney(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_code() {
        let order_id = Uuid::new_v4();
        let err: CommerceError = OrderError::NotMutable {
            order_id,
            status: OrderStatus::Completed,
        }
        .into();
        assert_eq!(err.code(), "ORDER_NOT_MUTABLE");

        let err: CommerceError = ProductError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 3,
            available: 1,
        }
        .into();
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
        assert!(err.to_string().contains("Available: 1"));

        let err: CommerceError = OrderError::InvalidStatus("bogus".to_string()).into();
        assert_eq!(err.code(), "INVALID_ORDER_STATUS");
    }

    #[test]
    fn test_only_storage_errors_are_transient() {
        assert!(CommerceError::Storage(StoreError::Database(sqlx::Error::PoolTimedOut)).is_transient());
        assert!(!CommerceError::OrderNotFound(Uuid::new_v4()).is_transient());
        assert!(!CommerceError::EmptyOrder.is_transient());
    }
}
