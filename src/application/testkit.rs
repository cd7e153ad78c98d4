use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::order::{CreateOrder, Order, OrderFilter, OrderLine};
use crate::domain::product::{CreateProduct, Product};
use crate::events::{EventDispatcher, RecordingSink};
use crate::metrics::Metrics;
use crate::store::{InMemoryStore, Store, StoreError, UnitOfWork};
use crate::utils::RetryConfig;
use super::{CommerceSettings, OrderService, ProductService};

/// Services wired to an in-memory store and a recording event sink.
pub struct TestApp {
    pub store: Arc<dyn Store>,
    pub orders: Arc<OrderService>,
    pub products: Arc<ProductService>,
    pub events: Arc<RecordingSink>,
    pub metrics: Arc<Metrics>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(Self::settings())
    }

    /// Defaults without retry delays.
    pub fn settings() -> CommerceSettings {
        CommerceSettings {
            retry: RetryConfig::no_retry(),
            ..CommerceSettings::default()
        }
    }

    pub fn with_settings(settings: CommerceSettings) -> Self {
        Self::build(Arc::new(InMemoryStore::new()), settings)
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self::build(store, Self::settings())
    }

    /// The first `failures` calls to `begin` fail with a pool timeout.
    pub fn flaky(failures: u32) -> Self {
        let store = FlakyStore {
            inner: InMemoryStore::new(),
            failures: AtomicU32::new(failures),
        };
        let settings = CommerceSettings {
            retry: RetryConfig::new(failures + 1, Duration::from_millis(1)),
            ..CommerceSettings::default()
        };
        Self::build(Arc::new(store), settings)
    }

    fn build(store: Arc<dyn Store>, settings: CommerceSettings) -> Self {
        let metrics = Arc::new(Metrics::new().unwrap());
        let events = Arc::new(RecordingSink::default());
        let dispatcher = Arc::new(EventDispatcher::new(metrics.clone()).with_sink(events.clone()));

        Self {
            orders: Arc::new(OrderService::new(
                store.clone(),
                dispatcher.clone(),
                metrics.clone(),
                settings.clone(),
            )),
            products: Arc::new(ProductService::new(store.clone(), dispatcher, metrics.clone(), settings)),
            store,
            events,
            metrics,
        }
    }

    pub async fn product(&self, name: &str, sku: &str, price: Decimal, stock: i32) -> Product {
        self.products
            .create_product(CreateProduct {
                name: name.to_string(),
                description: None,
                price,
                currency: None,
                stock_quantity: stock,
                sku: sku.to_string(),
                is_active: true,
            })
            .await
            .unwrap()
    }

    /// Pending order for a fresh customer.
    pub async fn order(&self, items: Vec<OrderLine>) -> Order {
        self.orders
            .create_order(CreateOrder {
                customer_id: Uuid::new_v4(),
                items,
                status: None,
                notes: None,
            })
            .await
            .unwrap()
    }

    pub async fn stock(&self, product_id: Uuid) -> i32 {
        self.store
            .find_product(product_id, true)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
            .value()
    }
}

struct FlakyStore {
    inner: InMemoryStore,
    failures: AtomicU32,
}

#[async_trait]
impl Store for FlakyStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.begin().await
    }

    async fn find_product(&self, id: Uuid, include_deleted: bool) -> Result<Option<Product>, StoreError> {
        self.inner.find_product(id, include_deleted).await
    }

    async fn list_products(&self, include_deleted: bool) -> Result<Vec<Product>, StoreError> {
        self.inner.list_products(include_deleted).await
    }

    async fn search_products(&self, keyword: &str, include_deleted: bool) -> Result<Vec<Product>, StoreError> {
        self.inner.search_products(keyword, include_deleted).await
    }

    async fn find_order(&self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError> {
        self.inner.find_order(id, include_deleted).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        self.inner.list_orders(filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
