// src/resilience/tests/circuit_breaker_tests.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::CircuitBreakerConfig;
use crate::error::PipelineError;
use crate::resilience::{CallOutcome, CircuitBreaker, CircuitState};

fn breaker(threshold: usize) -> CircuitBreaker {
    CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: threshold,
    })
    .unwrap()
}

#[test]
fn test_zero_threshold_is_rejected() {
    let result = CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 0,
    });
    assert!(result.is_err(), "Threshold 0 should fail at construction");
}

#[tokio::test]
async fn test_initial_state_is_closed() {
    let breaker = breaker(3);
    assert_eq!(breaker.state().await, CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);
}

#[tokio::test]
async fn test_success_passes_through() {
    let breaker = breaker(3);

    let outcome = breaker.call(|| async { Ok(true) }).await;
    assert_eq!(outcome, CallOutcome::Succeeded);
    assert!(outcome.is_success());
    assert_eq!(breaker.state().await, CircuitState::Closed);
}

#[tokio::test]
async fn test_circuit_opens_at_threshold() {
    let breaker = breaker(3);

    // Two failures: still closed
    for _ in 0..2 {
        let outcome = breaker.call(|| async { Ok(false) }).await;
        assert_eq!(outcome, CallOutcome::Failed);
    }
    assert_eq!(
        breaker.state().await,
        CircuitState::Closed,
        "Circuit should stay Closed below the threshold"
    );

    // Third consecutive failure opens the circuit
    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(
        breaker.state().await,
        CircuitState::Open,
        "Circuit should be Open after 3 failures"
    );
}

#[tokio::test]
async fn test_error_and_false_count_identically() {
    let breaker = breaker(2);

    let outcome = breaker
        .call(|| async { Err(PipelineError::Backend("boom".to_string())) })
        .await;
    assert_eq!(outcome, CallOutcome::Failed);
    assert_eq!(breaker.failure_count(), 1);

    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(
        breaker.state().await,
        CircuitState::Open,
        "Error plus falsy result should reach the threshold together"
    );
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let breaker = breaker(3);

    breaker.call(|| async { Ok(false) }).await;
    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(breaker.failure_count(), 2);

    breaker.call(|| async { Ok(true) }).await;
    assert_eq!(breaker.failure_count(), 0, "Success should reset the counter");

    // Two more failures do not open the circuit after the reset
    breaker.call(|| async { Ok(false) }).await;
    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(breaker.state().await, CircuitState::Closed);

    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(breaker.state().await, CircuitState::Open);
}

#[tokio::test]
async fn test_open_circuit_rejects_without_invoking() {
    let breaker = breaker(1);
    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(breaker.state().await, CircuitState::Open);

    let invocations = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let invocations = Arc::clone(&invocations);
        let outcome = breaker
            .call(move || async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            })
            .await;
        assert_eq!(outcome, CallOutcome::Rejected);
        assert!(!outcome.is_success());
    }

    assert_eq!(
        invocations.load(Ordering::SeqCst),
        0,
        "Open circuit must never invoke the operation"
    );
    assert_eq!(
        breaker.failure_count(),
        1,
        "Rejections must not touch the failure counter"
    );
}

#[tokio::test]
async fn test_manual_reset_closes_circuit() {
    let breaker = breaker(1);
    breaker.call(|| async { Ok(false) }).await;
    assert_eq!(breaker.state().await, CircuitState::Open);

    breaker.reset().await;
    assert_eq!(breaker.state().await, CircuitState::Closed);
    assert_eq!(breaker.failure_count(), 0);

    let outcome = breaker.call(|| async { Ok(true) }).await;
    assert_eq!(outcome, CallOutcome::Succeeded);
}
