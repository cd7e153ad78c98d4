// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
//
// Money and Quantity are shared by both aggregates and live in `shared`.
// Nothing in here performs I/O.
//
// ============================================================================

pub mod shared;
pub mod product;
pub mod order;
