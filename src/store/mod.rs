use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderFilter};
use crate::domain::product::{Product, Sku};
use crate::utils::IsTransient;

// ============================================================================
// Persistence Ports - Store and UnitOfWork
// ============================================================================
//
// A use case opens one UnitOfWork, does all of its reads-for-update and
// writes through it, then commits or rolls back. Rows read through
// `lock_*` stay locked until the unit of work ends, so the stock check and
// the decrement form one critical section.
//
// Plain reads outside a unit of work go through `Store` directly.
//
// ============================================================================

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt {table} row: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl StoreError {
    pub fn corrupt(table: &'static str, reason: impl std::fmt::Display) -> Self {
        StoreError::Corrupt {
            table,
            reason: reason.to_string(),
        }
    }
}

impl IsTransient for StoreError {
    fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => {
                // serialization_failure, deadlock_detected
                matches!(db.code().as_deref(), Some("40001") | Some("40P01"))
            }
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            StoreError::Database(sqlx::Error::Io(_)) => true,
            _ => false,
        }
    }
}

#[async_trait]
pub trait UnitOfWork: Send {
    /// Load a product for update, soft-deleted ones included.
    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Whether another product (not `except`) already uses `sku`.
    async fn sku_in_use(&mut self, sku: &Sku, except: Option<Uuid>) -> Result<bool, StoreError>;

    /// Insert or update a product row.
    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError>;

    async fn lock_order(&mut self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError>;

    /// Insert or update an order together with its full item list.
    async fn save_order(&mut self, order: &Order) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;

    async fn find_product(&self, id: Uuid, include_deleted: bool) -> Result<Option<Product>, StoreError>;

    /// Products ordered by name.
    async fn list_products(&self, include_deleted: bool) -> Result<Vec<Product>, StoreError>;

    /// Case-insensitive substring match on name or SKU, ordered by name.
    async fn search_products(&self, keyword: &str, include_deleted: bool) -> Result<Vec<Product>, StoreError>;

    async fn find_order(&self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError>;

    /// Newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}
