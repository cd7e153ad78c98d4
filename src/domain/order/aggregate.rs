use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;
use crate::domain::shared::{Money, MoneyError};
use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderNumber, OrderStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Owns the line items and the total. Stock is not touched here: the
// service layer reserves or releases stock in the same unit of work as the
// item mutation.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub order_number: OrderNumber,

    // Current State
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Set once a cancellation has returned the items to stock.
    #[serde(default)]
    pub stock_released_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Empty order shell; items are added afterwards.
    pub fn new(
        customer_id: Uuid,
        status: OrderStatus,
        notes: Option<String>,
        currency: &str,
    ) -> Result<Self, OrderError> {
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            order_number: OrderNumber::generate(now),
            customer_id,
            status,
            total_amount: Money::zero(currency)?,
            notes,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            stock_released_at: None,
        })
    }

    pub fn currency(&self) -> &str {
        self.total_amount.currency()
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Processing)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Pending and processing orders still hold the stock of their items.
    pub fn holds_reservations(&self) -> bool {
        self.is_mutable() && !self.items.is_empty()
    }

    pub fn ensure_mutable(&self) -> Result<(), OrderError> {
        if self.is_mutable() {
            Ok(())
        } else {
            Err(OrderError::NotMutable {
                order_id: self.id,
                status: self.status,
            })
        }
    }

    /// Completed orders are final. An order whose stock was already returned
    /// cannot be cancelled again, whatever status it has moved to since.
    pub fn ensure_cancellable(&self) -> Result<(), OrderError> {
        let blocked = matches!(self.status, OrderStatus::Completed | OrderStatus::Cancelled)
            || self.stock_released_at.is_some();

        if blocked {
            Err(OrderError::CannotBeCancelled {
                order_id: self.id,
                status: self.status,
            })
        } else {
            Ok(())
        }
    }

    pub fn ensure_transition(&self, next: OrderStatus) -> Result<(), OrderError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(OrderError::InvalidStatusTransition {
                order_id: self.id,
                from: self.status,
                to: next,
            })
        }
    }

    pub fn item(&self, item_id: Uuid) -> Result<&OrderItem, OrderError> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or(OrderError::ItemNotFound {
                order_id: self.id,
                item_id,
            })
    }

    /// Append a line priced at the product's current price.
    pub fn add_item(&mut self, product: &Product, quantity: i32) -> Result<&OrderItem, OrderError> {
        self.ensure_mutable()?;

        if !product.price.same_currency(&self.total_amount) {
            return Err(OrderError::InvalidMoney(MoneyError::CurrencyMismatch {
                left: self.currency().to_string(),
                right: product.price.currency().to_string(),
            }));
        }

        let item = OrderItem::new(self.id, product.id, quantity, product.price.clone())?;
        self.items.push(item);
        self.touch();

        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Result<OrderItem, OrderError> {
        self.ensure_mutable()?;

        let position = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(OrderError::ItemNotFound {
                order_id: self.id,
                item_id,
            })?;

        let removed = self.items.remove(position);
        self.touch();
        Ok(removed)
    }

    /// Change a line's quantity, keeping its snapshot price. Returns the
    /// previous quantity.
    pub fn update_item_quantity(&mut self, item_id: Uuid, new_quantity: i32) -> Result<i32, OrderError> {
        self.ensure_mutable()?;

        let order_id = self.id;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(OrderError::ItemNotFound { order_id, item_id })?;

        let previous = item.quantity;
        item.set_quantity(new_quantity)?;
        self.touch();
        Ok(previous)
    }

    pub fn recalculate_total(&mut self) -> Result<&Money, OrderError> {
        let currency = self.currency().to_string();
        let total = Money::sum(&currency, self.items.iter().map(|item| &item.subtotal))?;

        if total != self.total_amount {
            self.total_amount = total;
            self.touch();
        }
        Ok(&self.total_amount)
    }

    /// Whether the stored total equals the sum of item subtotals.
    pub fn total_is_consistent(&self) -> bool {
        Money::sum(self.currency(), self.items.iter().map(|item| &item.subtotal))
            .map(|sum| sum == self.total_amount)
            .unwrap_or(false)
    }

    /// Returns the previous status.
    pub fn set_status(&mut self, status: OrderStatus) -> OrderStatus {
        let previous = self.status;
        self.status = status;
        self.touch();
        previous
    }

    /// Move to cancelled and record that the items went back to stock.
    pub fn mark_cancelled(&mut self) -> OrderStatus {
        let previous = self.set_status(OrderStatus::Cancelled);
        self.stock_released_at = Some(self.updated_at);
        previous
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
