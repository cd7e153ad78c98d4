// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, OrderNumber, OrderItem)
// - Events (OrderCreated, OrderStatusChanged, OrderCancelled)
// - Commands (CreateOrder, OrderLine, OrderFilter)
// - Errors (OrderError enum)
// - Aggregate (Order with item and total rules)
//
// Stock movements live in the application layer, which runs them in the
// same unit of work as the aggregate changes.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
