//! Bounded admission of concurrent engine invocations
//!
//! A fixed pool of permits gates simultaneous subprocess runs. Waiting is
//! bounded by a short admission timeout; when it elapses the request is
//! rejected as `Overloaded` instead of queuing indefinitely. Release is
//! RAII: dropping a [`ScanPermit`] returns it to the pool on every path,
//! including timeouts and panics downstream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::domain::errors::ScanError;

/// Fixed-size pool of invocation permits
#[derive(Debug, Clone)]
pub struct ConcurrencyGuard {
    semaphore: Arc<Semaphore>,
    admission_timeout: Duration,
}

/// A held invocation slot; dropping it returns the permit to the pool
#[derive(Debug)]
pub struct ScanPermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyGuard {
    pub fn new(permits: usize, admission_timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits.max(1))),
            admission_timeout,
        }
    }

    /// Wait up to the admission timeout for a permit
    pub async fn acquire(&self) -> Result<ScanPermit, ScanError> {
        match tokio::time::timeout(
            self.admission_timeout,
            self.semaphore.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => {
                debug!(
                    available = self.semaphore.available_permits(),
                    "Invocation permit acquired"
                );
                Ok(ScanPermit { _permit: permit })
            }
            // The semaphore is never closed; acquire_owned only fails then.
            Ok(Err(_)) => Err(ScanError::Internal("Permit pool closed".into())),
            Err(_) => Err(ScanError::Overloaded),
        }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
