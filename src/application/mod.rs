// ============================================================================
// Application Layer - use cases over the domain model
// ============================================================================
//
// - OrderService: order/inventory consistency use cases and order queries
// - ProductService: catalog management and restocking
// - StockLedger: the single path for stock movement
// - CommerceError: the error every use case returns
//
// ============================================================================

mod errors;
mod ledger;
mod order_service;
mod product_service;
mod runner;

#[cfg(test)]
pub(crate) mod testkit;

pub use errors::CommerceError;
pub use order_service::OrderService;
pub use product_service::ProductService;

use crate::domain::shared::DEFAULT_CURRENCY;
use crate::utils::RetryConfig;

/// Behaviour switches shared by the services.
#[derive(Debug, Clone)]
pub struct CommerceSettings {
    /// Currency for new orders and for products created without one.
    pub default_currency: String,
    /// Reject status updates that the status graph does not allow.
    pub enforce_status_transitions: bool,
    pub retry: RetryConfig,
}

impl Default for CommerceSettings {
    fn default() -> Self {
        Self {
            default_currency: DEFAULT_CURRENCY.to_string(),
            enforce_status_transitions: true,
            retry: RetryConfig::default(),
        }
    }
}
