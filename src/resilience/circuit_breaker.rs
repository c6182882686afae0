use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::CircuitBreakerConfig;
use crate::error::{PipelineError, Result};

/// The state of the circuit breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, calls flow normally
    Closed,
    /// Circuit is open, calls are rejected without invoking the operation
    Open,
    /// Reserved probing state. Nothing in this crate transitions into it;
    /// it is kept in the model for callers that drive recovery externally.
    HalfOpen,
}

/// Classification of a guarded call.
///
/// A [`Rejected`](CallOutcome::Rejected) outcome means the circuit was open:
/// the operation was never invoked and the failure counter was not touched.
/// This keeps an open-circuit rejection distinguishable from an operation
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The operation ran and reported success
    Succeeded,
    /// The operation ran and reported failure or returned an error
    Failed,
    /// The circuit was open; the operation was not invoked
    Rejected,
}

impl CallOutcome {
    /// Collapses the outcome to the boolean the guarded operation produced
    /// (`false` for failures and rejections alike).
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Succeeded)
    }
}

/// Circuit breaker implementation
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Current state of the circuit breaker
    state: RwLock<CircuitState>,
    /// Count of consecutive failures
    failure_count: AtomicUsize,
    /// Configuration for the circuit breaker
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration.
    /// A failure threshold of zero is rejected.
    pub fn new(config: CircuitBreakerConfig) -> Result<Self> {
        if config.failure_threshold == 0 {
            return Err(PipelineError::Config(
                "circuit breaker failure threshold must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicUsize::new(0),
            config,
        })
    }

    /// Run `operation` through the breaker and classify its outcome.
    ///
    /// An operation reporting `Ok(false)` and one returning `Err` count
    /// identically as a single failure. A success resets the failure counter.
    /// Reaching the failure threshold opens the circuit; while open, calls
    /// return [`CallOutcome::Rejected`] without invoking the operation.
    pub async fn call<F, Fut>(&self, operation: F) -> CallOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        // Get a copy of the current state to avoid holding the lock
        let current_state = *self.state.read().await;

        if current_state == CircuitState::Open {
            debug!("Circuit open, rejecting call without invoking operation");
            return CallOutcome::Rejected;
        }

        // Closed, or the reserved HalfOpen probe state: invoke the operation
        match operation().await {
            Ok(true) => {
                self.failure_count.store(0, Ordering::SeqCst);
                CallOutcome::Succeeded
            }
            Ok(false) => {
                self.record_failure().await;
                CallOutcome::Failed
            }
            Err(err) => {
                debug!("Guarded operation returned an error: {}", err);
                self.record_failure().await;
                CallOutcome::Failed
            }
        }
    }

    /// Record one failure, opening the circuit at the threshold.
    async fn record_failure(&self) {
        let new_failure_count = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;

        if new_failure_count >= self.config.failure_threshold {
            let mut state = self.state.write().await;
            *state = CircuitState::Open;
            warn!(
                "Circuit breaker opened after {} consecutive failures",
                new_failure_count
            );
        }
    }

    /// Get the current state of the circuit breaker
    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Number of consecutive failures recorded so far
    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// External reset: close the circuit and zero the failure counter.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = CircuitState::Closed;
        self.failure_count.store(0, Ordering::SeqCst);
        debug!("Circuit breaker reset to closed");
    }
}
