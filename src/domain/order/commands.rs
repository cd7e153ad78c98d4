use serde::Deserialize;
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub customer_id: Uuid,
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrder {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        match self.items.iter().find(|line| line.quantity < 1) {
            Some(line) => Err(OrderError::InvalidQuantity(line.quantity)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Read-side selection of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl OrderFilter {
    pub fn by_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn by_customer(customer_id: Uuid) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, order: &super::aggregate::Order) -> bool {
        (self.include_deleted || !order.is_deleted())
            && self.status.map_or(true, |status| order.status == status)
            && self.customer_id.map_or(true, |customer| order.customer_id == customer)
    }
}
