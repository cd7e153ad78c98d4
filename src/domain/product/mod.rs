// ============================================================================
// Product Domain - Catalog entries and their stock level
// ============================================================================
//
// - Value objects (Sku)
// - Commands (CreateProduct, UpdateProduct)
// - Errors (ProductError, SkuError)
// - Aggregate (Product with reserve/release stock rules)
// - Events (ProductCreated, ProductUpdated)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
