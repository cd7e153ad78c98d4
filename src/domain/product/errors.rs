use uuid::Uuid;

use crate::domain::shared::{MoneyError, QuantityError};

// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkuError {
    #[error("SKU cannot be empty")]
    Empty,

    #[error("SKU cannot exceed 50 characters (got {0})")]
    TooLong(usize),

    #[error("SKU can only contain alphanumeric characters, hyphens, and underscores: {0:?}")]
    InvalidCharacters(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductError {
    #[error("Insufficient stock for product {product_id}. Requested: {requested}, Available: {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Invalid stock quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    #[error("Product name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    InvalidSku(#[from] SkuError),

    #[error(transparent)]
    InvalidMoney(#[from] MoneyError),
}
