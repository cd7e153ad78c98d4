use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::order::{Order, OrderFilter};
use crate::domain::product::{Product, Sku};
use super::{Store, StoreError, UnitOfWork};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// One unit of work at a time: `begin` takes an owned guard on the state and
// works on a copy of it. Commit swaps the copy in; rollback (or dropping the
// unit of work) discards it. Plain reads wait for any open unit of work.
//
// ============================================================================

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }

    async fn find_product(&self, id: Uuid, include_deleted: bool) -> Result<Option<Product>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .get(&id)
            .filter(|product| include_deleted || !product.is_deleted())
            .cloned())
    }

    async fn list_products(&self, include_deleted: bool) -> Result<Vec<Product>, StoreError> {
        self.search_products("", include_deleted).await
    }

    async fn search_products(&self, keyword: &str, include_deleted: bool) -> Result<Vec<Product>, StoreError> {
        let state = self.state.lock().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|product| include_deleted || !product.is_deleted())
            .filter(|product| product.matches_keyword(keyword))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(products)
    }

    async fn find_order(&self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .get(&id)
            .filter(|order| include_deleted || !order.is_deleted())
            .cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    working: State,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn sku_in_use(&mut self, sku: &Sku, except: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self
            .working
            .products
            .values()
            .any(|product| &product.sku == sku && Some(product.id) != except))
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError> {
        self.working.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn lock_order(&mut self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError> {
        Ok(self
            .working
            .orders
            .get(&id)
            .filter(|order| include_deleted || !order.is_deleted())
            .cloned())
    }

    async fn save_order(&mut self, order: &Order) -> Result<(), StoreError> {
        self.working.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
