use std::sync::Arc;
use uuid::Uuid;

use crate::domain::order::{
    CreateOrder, Order, OrderCancelled, OrderCreated, OrderEvent, OrderFilter, OrderStatus,
    OrderStatusChanged,
};
use crate::events::EventDispatcher;
use crate::metrics::Metrics;
use crate::store::{Store, UnitOfWork};
use super::errors::CommerceError;
use super::ledger::StockLedger;
use super::runner::{Outcome, Runner};
use super::CommerceSettings;

// ============================================================================
// Order Service - order / inventory consistency
// ============================================================================
//
// Each public method is one use case. The transactional body (`*_tx`) runs
// against a single unit of work: load and lock the order, move stock through
// the ledger, mutate the aggregate, recalculate the total and persist. Any
// error rolls the whole unit back, so order and stock are never left half
// updated. Events go out only after commit.
//
// ============================================================================

pub const DEFAULT_CANCEL_REASON: &str = "Cancelled by request";

pub struct OrderService {
    runner: Runner,
    settings: CommerceSettings,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn Store>,
        events: Arc<EventDispatcher>,
        metrics: Arc<Metrics>,
        settings: CommerceSettings,
    ) -> Self {
        Self {
            runner: Runner::new(store, events, metrics, settings.retry.clone()),
            settings,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub async fn create_order(&self, command: CreateOrder) -> Result<Order, CommerceError> {
        let command = &command;
        self.runner
            .run("create_order", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.create_order_tx(uow.as_mut(), command).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        self.runner
            .run("update_order_status", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.update_status_tx(uow.as_mut(), order_id, new_status).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn cancel_order(&self, order_id: Uuid, reason: Option<String>) -> Result<Order, CommerceError> {
        let reason = reason
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_string());
        let reason = reason.as_str();

        self.runner
            .run("cancel_order", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.cancel_tx(uow.as_mut(), order_id, reason).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn add_item_to_order(
        &self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Order, CommerceError> {
        self.runner
            .run("add_item_to_order", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.add_item_tx(uow.as_mut(), order_id, product_id, quantity).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    /// Zero removes the line; negative quantities are rejected.
    pub async fn update_order_item_quantity(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        new_quantity: i32,
    ) -> Result<Order, CommerceError> {
        self.runner
            .run("update_order_item_quantity", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self
                    .update_item_quantity_tx(uow.as_mut(), order_id, item_id, new_quantity)
                    .await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn remove_order_item(&self, order_id: Uuid, item_id: Uuid) -> Result<Order, CommerceError> {
        self.runner
            .run("remove_order_item", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.remove_item_tx(uow.as_mut(), order_id, item_id).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn recalculate_order_total(&self, order_id: Uuid) -> Result<Order, CommerceError> {
        self.runner
            .run("recalculate_order_total", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.recalculate_tx(uow.as_mut(), order_id).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    /// Soft delete. Stock held by the order is not released.
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), CommerceError> {
        self.runner
            .run("delete_order", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.delete_tx(uow.as_mut(), order_id).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn get_order(&self, order_id: Uuid, include_deleted: bool) -> Result<Order, CommerceError> {
        self.runner
            .store()
            .find_order(order_id, include_deleted)
            .await?
            .ok_or(CommerceError::OrderNotFound(order_id))
    }

    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, CommerceError> {
        Ok(self.runner.store().list_orders(filter).await?)
    }

    // ========================================================================
    // Transactional bodies
    // ========================================================================

    async fn create_order_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        command: &CreateOrder,
    ) -> Result<Outcome<Order>, CommerceError> {
        command.validate()?;

        // Items go onto a pending shell; the requested status is applied last
        let mut order = Order::new(
            command.customer_id,
            OrderStatus::Pending,
            command.notes.clone(),
            &self.settings.default_currency,
        )?;

        let mut ledger = StockLedger::new();
        for line in &command.items {
            let product = ledger.reserve(uow, line.product_id, line.quantity).await?;
            order.add_item(&product, line.quantity)?;
        }

        let status = command.status.unwrap_or_default();
        if status != OrderStatus::Pending {
            order.set_status(status);
        }
        order.recalculate_total()?;
        uow.save_order(&order).await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            customer_id = %order.customer_id,
            items = order.items.len(),
            total = %order.total_amount,
            "Order created"
        );

        Ok(Outcome::new(order.clone())
            .with_event(OrderEvent::Created(OrderCreated { order }))
            .with_stock(&ledger))
    }

    async fn update_status_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Outcome<Order>, CommerceError> {
        let mut order = load_order(uow, order_id).await?;

        if self.settings.enforce_status_transitions {
            order.ensure_transition(new_status)?;
        }

        let previous_status = order.set_status(new_status);
        uow.save_order(&order).await?;

        tracing::info!(
            order_id = %order_id,
            previous_status = %previous_status,
            new_status = %new_status,
            "Order status updated"
        );

        Ok(Outcome::new(order.clone()).with_event(OrderEvent::StatusChanged(OrderStatusChanged {
            order,
            previous_status,
            new_status,
        })))
    }

    async fn cancel_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
        reason: &str,
    ) -> Result<Outcome<Order>, CommerceError> {
        let mut order = load_order(uow, order_id).await?;
        order.ensure_cancellable()?;

        let mut ledger = StockLedger::new();
        for item in &order.items {
            ledger.release(uow, item.product_id, item.quantity).await?;
        }

        order.mark_cancelled();
        uow.save_order(&order).await?;

        tracing::info!(
            order_id = %order_id,
            units_released = ledger.released(),
            reason = %reason,
            "Order cancelled"
        );

        Ok(Outcome::new(order.clone())
            .with_event(OrderEvent::Cancelled(OrderCancelled {
                order,
                reason: reason.to_string(),
            }))
            .with_stock(&ledger))
    }

    async fn add_item_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Outcome<Order>, CommerceError> {
        let mut order = load_order(uow, order_id).await?;
        order.ensure_mutable()?;
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(format!(
                "item quantity must be at least 1 (got {quantity})"
            )));
        }

        let mut ledger = StockLedger::new();
        let product = ledger.reserve(uow, product_id, quantity).await?;
        let item_id = order.add_item(&product, quantity)?.id;
        order.recalculate_total()?;
        uow.save_order(&order).await?;

        tracing::info!(
            order_id = %order_id,
            item_id = %item_id,
            product_id = %product_id,
            quantity = quantity,
            total = %order.total_amount,
            "Item added to order"
        );

        Ok(Outcome::new(order).with_stock(&ledger))
    }

    async fn update_item_quantity_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
        item_id: Uuid,
        new_quantity: i32,
    ) -> Result<Outcome<Order>, CommerceError> {
        if new_quantity < 0 {
            return Err(CommerceError::InvalidQuantity(format!(
                "item quantity cannot be negative (got {new_quantity})"
            )));
        }
        if new_quantity == 0 {
            return self.remove_item_tx(uow, order_id, item_id).await;
        }

        let mut order = load_order(uow, order_id).await?;
        order.ensure_mutable()?;
        let item = order.item(item_id)?;
        let (product_id, current) = (item.product_id, item.quantity);

        let mut ledger = StockLedger::new();
        let diff = new_quantity - current;
        if diff > 0 {
            ledger.reserve(uow, product_id, diff).await?;
        } else if diff < 0 {
            ledger.release(uow, product_id, -diff).await?;
        }

        order.update_item_quantity(item_id, new_quantity)?;
        order.recalculate_total()?;
        uow.save_order(&order).await?;

        tracing::info!(
            order_id = %order_id,
            item_id = %item_id,
            previous_quantity = current,
            new_quantity = new_quantity,
            total = %order.total_amount,
            "Order item quantity updated"
        );

        Ok(Outcome::new(order).with_stock(&ledger))
    }

    async fn remove_item_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Outcome<Order>, CommerceError> {
        let mut order = load_order(uow, order_id).await?;
        order.ensure_mutable()?;
        let item = order.item(item_id)?;
        let (product_id, quantity) = (item.product_id, item.quantity);

        let mut ledger = StockLedger::new();
        ledger.release(uow, product_id, quantity).await?;
        order.remove_item(item_id)?;
        order.recalculate_total()?;
        uow.save_order(&order).await?;

        tracing::info!(
            order_id = %order_id,
            item_id = %item_id,
            quantity_released = quantity,
            total = %order.total_amount,
            "Item removed from order"
        );

        Ok(Outcome::new(order).with_stock(&ledger))
    }

    async fn recalculate_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: Uuid,
    ) -> Result<Outcome<Order>, CommerceError> {
        let mut order = load_order(uow, order_id).await?;
        let before = order.total_amount.clone();
        order.recalculate_total()?;

        if order.total_amount != before {
            tracing::warn!(
                order_id = %order_id,
                stored = %before,
                recalculated = %order.total_amount,
                "Order total was out of date"
            );
            uow.save_order(&order).await?;
        }
        Ok(Outcome::new(order))
    }

    async fn delete_tx(&self, uow: &mut dyn UnitOfWork, order_id: Uuid) -> Result<Outcome<()>, CommerceError> {
        let mut order = load_order(uow, order_id).await?;

        if order.holds_reservations() {
            tracing::warn!(
                order_id = %order_id,
                status = %order.status,
                items = order.items.len(),
                "Deleting an order that still holds stock; reserved units are not returned"
            );
        }

        order.soft_delete();
        uow.save_order(&order).await?;
        tracing::info!(order_id = %order_id, "Order deleted");

        Ok(Outcome::new(()))
    }
}

async fn load_order(uow: &mut dyn UnitOfWork, order_id: Uuid) -> Result<Order, CommerceError> {
    uow.lock_order(order_id, false)
        .await?
        .ok_or(CommerceError::OrderNotFound(order_id))
}

// ============================================================================
// Tests
// ============================================================================
