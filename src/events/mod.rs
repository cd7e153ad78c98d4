// ============================================================================
// Domain Event Delivery
// ============================================================================
//
// Events are produced by the services after a unit of work commits and are
// handed to an injected dispatcher. There is no process-wide event bus.
//
// ============================================================================

mod dispatcher;
mod envelope;
mod sinks;

pub use dispatcher::EventDispatcher;
pub use envelope::CommerceEvent;
pub use sinks::{ActivityLogSink, CustomerNotificationSink};

#[cfg(test)]
pub(crate) use sinks::RecordingSink;
