use rust_decimal::Decimal;
use serde::Deserialize;

// ============================================================================
// Product Commands - Represent catalog management intent
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub stock_quantity: i32,
    pub sku: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; `None` leaves the field untouched. Stock only moves
/// through reservations, releases and restocks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub sku: Option<String>,
    pub is_active: Option<bool>,
}
