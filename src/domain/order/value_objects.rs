use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::shared::Money;
use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// Parse a status label, ignoring case.
    pub fn parse(value: &str) -> Result<Self, OrderError> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.value() == normalized)
            .ok_or(OrderError::InvalidStatus(normalized))
    }

    pub fn value(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Lifecycle graph:
    /// pending -> processing -> completed, pending|processing -> cancelled,
    /// anything but completed -> refunded. Re-setting the same status is allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        if *self == next {
            return true;
        }

        match (*self, next) {
            (Pending, Processing) => true,
            (Processing, Completed) => true,
            (Pending | Processing, Cancelled) => true,
            (Completed, Refunded) => false,
            (_, Refunded) => true,
            _ => false,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::parse(s)
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderStatus::parse(&value)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Human-facing order reference: `ORD-YYYYMMDD-XXXXXXXX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn generate(at: DateTime<Utc>) -> Self {
        let random = Uuid::new_v4();
        let suffix: String = random.as_bytes()[..4]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();

        Self(format!("ORD-{}-{}", at.format("%Y%m%d"), suffix))
    }

    /// Wrap a value loaded from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line item. `unit_price` is the product price captured when the line was
/// added and is never re-read from the catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl OrderItem {
    pub fn new(
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        let subtotal = unit_price.multiply(quantity as i64)?;

        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            quantity,
            unit_price,
            subtotal,
        })
    }

    pub fn set_quantity(&mut self, quantity: i32) -> Result<(), OrderError> {
        if quantity < 1 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        self.subtotal = self.unit_price.multiply(quantity as i64)?;
        self.quantity = quantity;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
