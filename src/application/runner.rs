use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::events::{CommerceEvent, EventDispatcher};
use crate::metrics::Metrics;
use crate::store::{Store, UnitOfWork};
use crate::utils::{retry_on_transient, RetryConfig};
use super::errors::CommerceError;
use super::ledger::StockLedger;

// ============================================================================
// Use-Case Runner
// ============================================================================
//
// Drives one use case end to end:
//   1. open a unit of work and run the transactional body
//   2. commit on success, roll back on failure
//   3. retry the whole attempt on transient storage errors
//   4. after a successful commit, report stock movement and publish events
//
// ============================================================================

/// What a committed use case hands back: its result plus the events and
/// stock movements to report once the transaction is durable.
pub struct Outcome<T> {
    pub value: T,
    events: Vec<CommerceEvent>,
    reserved: u64,
    released: u64,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            events: Vec::new(),
            reserved: 0,
            released: 0,
        }
    }

    pub fn with_event(mut self, event: impl Into<CommerceEvent>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn with_stock(mut self, ledger: &StockLedger) -> Self {
        self.reserved += ledger.reserved();
        self.released += ledger.released();
        self
    }
}

#[derive(Clone)]
pub struct Runner {
    store: Arc<dyn Store>,
    events: Arc<EventDispatcher>,
    metrics: Arc<Metrics>,
    retry: RetryConfig,
}

impl Runner {
    pub fn new(
        store: Arc<dyn Store>,
        events: Arc<EventDispatcher>,
        metrics: Arc<Metrics>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            events,
            metrics,
            retry,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CommerceError> {
        Ok(self.store.begin().await?)
    }

    /// Commit on success, roll back on failure.
    pub async fn finish<T>(
        &self,
        uow: Box<dyn UnitOfWork>,
        result: Result<Outcome<T>, CommerceError>,
    ) -> Result<Outcome<T>, CommerceError> {
        match result {
            Ok(outcome) => {
                uow.commit().await?;
                Ok(outcome)
            }
            Err(error) => {
                if let Err(rollback_error) = uow.rollback().await {
                    tracing::warn!(error = %rollback_error, "Rollback failed");
                }
                Err(error)
            }
        }
    }

    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T, CommerceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Outcome<T>, CommerceError>>,
    {
        let started = Instant::now();

        let result = retry_on_transient(&self.retry, |n| {
            if n > 1 {
                self.metrics.record_retry_attempt(operation);
            }
            attempt()
        })
        .await
        .into_result();

        match result {
            Ok(outcome) => {
                self.metrics.record_operation(operation, "success", started.elapsed());
                self.metrics.record_reserved(outcome.reserved);
                self.metrics.record_released(outcome.released);
                self.events.publish_all(outcome.events).await;
                Ok(outcome.value)
            }
            Err(error) => {
                self.metrics.record_operation(operation, error.code(), started.elapsed());
                if matches!(error, CommerceError::InsufficientStock { .. }) {
                    self.metrics.record_insufficient_stock();
                }
                if let CommerceError::Storage(_) = error {
                    tracing::error!(operation = operation, error = %error, "Use case failed");
                } else {
                    tracing::info!(
                        operation = operation,
                        code = error.code(),
                        error = %error,
                        "Use case rejected"
                    );
                }
                Err(error)
            }
        }
    }
}
