// src/config/mod.rs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the distributed system orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Capacity of the result cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Ordered pool of backend servers handed out round-robin
    #[serde(default = "default_servers")]
    pub servers: Vec<String>,

    /// Maximum number of queued messages drained per maintenance pass
    #[serde(default = "default_drain_batch_size")]
    pub drain_batch_size: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            servers: default_servers(),
            drain_batch_size: default_drain_batch_size(),
        }
    }
}

fn default_cache_capacity() -> usize {
    100
}

fn default_servers() -> Vec<String> {
    (1..=4).map(|i| format!("server-{}", i)).collect()
}

fn default_drain_batch_size() -> usize {
    10
}

/// Configuration for the circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: usize,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
        }
    }
}

fn default_failure_threshold() -> usize {
    5
}

/// Configuration for sliding-window rate limiting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateWindowConfig {
    /// Window duration
    #[serde(with = "duration_serde")]
    pub window: Duration,

    /// Maximum number of requests tolerated within the window
    pub limit: usize,
}

// Helper module to serialize/deserialize Duration with serde
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
