use uuid::Uuid;

use crate::domain::product::{Product, ProductError};
use crate::store::UnitOfWork;
use super::errors::CommerceError;

// ============================================================================
// Stock Ledger
// ============================================================================
//
// The only code path that changes `Product::stock_quantity`. Every call
// runs inside the caller's unit of work, so a later failure in the same use
// case rolls the stock movement back with everything else.
//
// The ledger also tallies the units it moved; the runner reports them to
// metrics once the unit of work has committed.
//
// ============================================================================

#[derive(Debug, Default)]
pub struct StockLedger {
    reserved: u64,
    released: u64,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the product and take `quantity` units out of stock. Returns the
    /// product as it stands after the decrement.
    pub async fn reserve(
        &mut self,
        uow: &mut dyn UnitOfWork,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Product, CommerceError> {
        let mut product = uow
            .lock_product(product_id)
            .await?
            .filter(|product| !product.is_deleted())
            .ok_or(CommerceError::ProductNotFound(product_id))?;

        let remaining = match product.reserve(quantity) {
            Ok(remaining) => remaining,
            Err(e @ ProductError::InsufficientStock { .. }) => {
                tracing::warn!(
                    product_id = %product_id,
                    requested = quantity,
                    available = product.stock_quantity.value(),
                    "Insufficient stock"
                );
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        uow.save_product(&product).await?;
        self.reserved += u64::from(quantity.unsigned_abs());

        tracing::debug!(
            product_id = %product_id,
            quantity = quantity,
            remaining = remaining.value(),
            "Stock reserved"
        );
        Ok(product)
    }

    /// Put `quantity` units back. Soft-deleted products still accept
    /// releases so cancelled orders restore what they took.
    pub async fn release(
        &mut self,
        uow: &mut dyn UnitOfWork,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Product, CommerceError> {
        let mut product = uow
            .lock_product(product_id)
            .await?
            .ok_or(CommerceError::ProductNotFound(product_id))?;

        let restored = product.release(quantity)?;
        uow.save_product(&product).await?;
        self.released += u64::from(quantity.unsigned_abs());

        tracing::debug!(
            product_id = %product_id,
            quantity = quantity,
            stock = restored.value(),
            "Stock released"
        );
        Ok(product)
    }

    pub fn reserved(&self) -> u64 {
        self.reserved
    }

    pub fn released(&self) -> u64 {
        self.released
    }
}
