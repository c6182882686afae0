// src/resilience/mod.rs
//! Failure isolation for the request pipeline.
//!
//! The circuit breaker guards a fallible operation: once a configured number
//! of consecutive failures is reached the circuit opens and further calls are
//! rejected without invoking the operation at all.

mod circuit_breaker;

#[cfg(test)]
mod tests;

// Re-export key components
pub use circuit_breaker::{CallOutcome, CircuitBreaker, CircuitState};
