use std::sync::Arc;
use uuid::Uuid;

use crate::domain::product::{CreateProduct, Product, ProductCreated, ProductEvent, ProductUpdated, UpdateProduct};
use crate::events::EventDispatcher;
use crate::metrics::Metrics;
use crate::store::{Store, UnitOfWork};
use super::errors::CommerceError;
use super::ledger::StockLedger;
use super::runner::{Outcome, Runner};
use super::CommerceSettings;

// ============================================================================
// Product Service - catalog management
// ============================================================================

pub struct ProductService {
    runner: Runner,
    settings: CommerceSettings,
}

impl ProductService {
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

    pub async fn create_product(&self, command: CreateProduct) -> Result<Product, CommerceError> {
        let mut command = command;
        if command.currency.is_none() {
            command.currency = Some(self.settings.default_currency.clone());
        }
        let command = &command;

        self.runner
            .run("create_product", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.create_tx(uow.as_mut(), command).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    /// Apply the given fields. Returns the product unchanged, without an
    /// event, when nothing differs.
    pub async fn update_product(&self, product_id: Uuid, update: UpdateProduct) -> Result<Product, CommerceError> {
        let update = &update;
        self.runner
            .run("update_product", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.update_tx(uow.as_mut(), product_id, update).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    /// Add `quantity` units of stock.
    pub async fn restock_product(&self, product_id: Uuid, quantity: i32) -> Result<Product, CommerceError> {
        self.runner
            .run("restock_product", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.restock_tx(uow.as_mut(), product_id, quantity).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), CommerceError> {
        self.runner
            .run("delete_product", || async move {
                let mut uow = self.runner.begin().await?;
                let result = self.delete_tx(uow.as_mut(), product_id).await;
                self.runner.finish(uow, result).await
            })
            .await
    }

    pub async fn get_product(&self, product_id: Uuid, include_deleted: bool) -> Result<Product, CommerceError> {
        self.runner
            .store()
            .find_product(product_id, include_deleted)
            .await?
            .ok_or(CommerceError::ProductNotFound(product_id))
    }

    pub async fn list_products(&self, include_deleted: bool) -> Result<Vec<Product>, CommerceError> {
        Ok(self.runner.store().list_products(include_deleted).await?)
    }

    pub async fn search_products(&self, keyword: &str, include_deleted: bool) -> Result<Vec<Product>, CommerceError> {
        Ok(self.runner.store().search_products(keyword, include_deleted).await?)
    }

    async fn create_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        command: &CreateProduct,
    ) -> Result<Outcome<Product>, CommerceError> {
        let product = Product::create(command)?;
        if uow.sku_in_use(&product.sku, None).await? {
            return Err(CommerceError::DuplicateSku(product.sku.to_string()));
        }
        uow.save_product(&product).await?;

        tracing::info!(
            product_id = %product.id,
            sku = %product.sku,
            price = %product.price,
            stock = product.stock_quantity.value(),
            "Product created"
        );

        Ok(Outcome::new(product.clone()).with_event(ProductEvent::Created(ProductCreated { product })))
    }

    async fn update_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        product_id: Uuid,
        update: &UpdateProduct,
    ) -> Result<Outcome<Product>, CommerceError> {
        let mut product = lock_listed_product(uow, product_id).await?;

        let changes = product.apply_update(update)?;
        if changes.is_empty() {
            return Ok(Outcome::new(product));
        }
        if changes.iter().any(|change| change == "sku") && uow.sku_in_use(&product.sku, Some(product_id)).await? {
            return Err(CommerceError::DuplicateSku(product.sku.to_string()));
        }
        uow.save_product(&product).await?;

        tracing::info!(product_id = %product_id, changes = ?changes, "Product updated");

        Ok(Outcome::new(product.clone()).with_event(ProductEvent::Updated(ProductUpdated { product, changes })))
    }

    async fn restock_tx(
        &self,
        uow: &mut dyn UnitOfWork,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Outcome<Product>, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(format!(
                "restock quantity must be at least 1 (got {quantity})"
            )));
        }
        lock_listed_product(uow, product_id).await?;

        let mut ledger = StockLedger::new();
        let product = ledger.release(uow, product_id, quantity).await?;

        tracing::info!(
            product_id = %product_id,
            added = quantity,
            stock = product.stock_quantity.value(),
            "Product restocked"
        );

        Ok(Outcome::new(product.clone())
            .with_event(ProductEvent::Updated(ProductUpdated {
                product,
                changes: vec!["stock_quantity".to_string()],
            }))
            .with_stock(&ledger))
    }

    async fn delete_tx(&self, uow: &mut dyn UnitOfWork, product_id: Uuid) -> Result<Outcome<()>, CommerceError> {
        let mut product = lock_listed_product(uow, product_id).await?;
        product.soft_delete();
        uow.save_product(&product).await?;

        tracing::info!(product_id = %product_id, sku = %product.sku, "Product deleted");
        Ok(Outcome::new(()))
    }
}

/// Lock a product that has not been soft-deleted.
async fn lock_listed_product(uow: &mut dyn UnitOfWork, product_id: Uuid) -> Result<Product, CommerceError> {
    uow.lock_product(product_id)
        .await?
        .filter(|product| !product.is_deleted())
        .ok_or(CommerceError::ProductNotFound(product_id))
}
