use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::{Money, Quantity, DEFAULT_CURRENCY};
use super::commands::{CreateProduct, UpdateProduct};
use super::errors::ProductError;
use super::value_objects::Sku;

// ============================================================================
// Product Aggregate - Catalog entry and authoritative stock level
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // Identity
    pub id: Uuid,
    pub sku: Sku,

    // Catalog data
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub is_active: bool,

    // Availability
    pub stock_quantity: Quantity,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn create(command: &CreateProduct) -> Result<Self, ProductError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }

        let currency = command.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            sku: Sku::new(&command.sku)?,
            name: name.to_string(),
            description: command.description.clone(),
            price: Money::new(command.price, currency)?,
            is_active: command.is_active,
            stock_quantity: Quantity::new(command.stock_quantity)?,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Take `quantity` units out of stock and return the remaining level.
    /// Leaves the product untouched when stock is short.
    pub fn reserve(&mut self, quantity: i32) -> Result<Quantity, ProductError> {
        Quantity::new(quantity)?;

        let remaining = self.stock_quantity.checked_sub(quantity).ok_or(
            ProductError::InsufficientStock {
                product_id: self.id,
                requested: quantity,
                available: self.stock_quantity.value(),
            },
        )?;

        self.stock_quantity = remaining;
        self.updated_at = Utc::now();
        Ok(remaining)
    }

    /// Put `quantity` units back. There is no upper bound.
    pub fn release(&mut self, quantity: i32) -> Result<Quantity, ProductError> {
        let restored = self.stock_quantity.checked_add(quantity)?;
        self.stock_quantity = restored;
        self.updated_at = Utc::now();
        Ok(restored)
    }

    /// Apply a partial update and return the names of the fields that changed.
    pub fn apply_update(&mut self, update: &UpdateProduct) -> Result<Vec<String>, ProductError> {
        // Validate everything before touching state
        let name = match &update.name {
            Some(name) if name.trim().is_empty() => return Err(ProductError::EmptyName),
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let price = update
            .price
            .map(|amount| Money::new(amount, self.price.currency()))
            .transpose()?;
        let sku = update.sku.as_deref().map(Sku::new).transpose()?;

        let mut changes = Vec::new();

        if let Some(name) = name {
            if name != self.name {
                self.name = name;
                changes.push("name".to_string());
            }
        }
        if let Some(description) = &update.description {
            if self.description.as_ref() != Some(description) {
                self.description = Some(description.clone());
                changes.push("description".to_string());
            }
        }
        if let Some(price) = price {
            if price != self.price {
                self.price = price;
                changes.push("price".to_string());
            }
        }
        if let Some(sku) = sku {
            if sku != self.sku {
                self.sku = sku;
                changes.push("sku".to_string());
            }
        }
        if let Some(is_active) = update.is_active {
            if is_active != self.is_active {
                self.is_active = is_active;
                changes.push("is_active".to_string());
            }
        }

        if !changes.is_empty() {
            self.updated_at = Utc::now();
        }
        Ok(changes)
    }

    pub fn soft_delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Case-insensitive substring match on name or SKU.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&keyword)
            || self.sku.as_str().to_lowercase().contains(&keyword)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
