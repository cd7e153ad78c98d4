// ============================================================================
// Shared Kernel - value objects used by more than one aggregate
// ============================================================================

pub mod errors;
pub mod value_objects;

pub use errors::*;
pub use value_objects::*;
