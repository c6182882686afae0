// src/system/mod.rs

pub mod backend;
pub mod distributed;

#[cfg(test)]
mod tests;

pub use backend::{Backend, SimulatedBackend};
pub use distributed::DistributedSystem;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server name reported for responses served straight from the cache
pub const CACHE_SERVER: &str = "cache";

/// A request entering the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemRequest {
    /// Caller-chosen identifier; doubles as the cache key
    pub id: String,

    /// Opaque payload carried through to the backend
    pub payload: Value,

    /// Caller-assigned priority (carried, not yet scheduled on)
    pub priority: u32,

    /// Arrival time in unix milliseconds, stamped on enqueue when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// The pipeline's answer to a [`SystemRequest`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemResponse {
    /// Always equals the originating request's id
    pub request_id: String,

    /// Synthesized or cached result payload
    pub result: Value,

    /// Server that produced the result, or `"cache"` on a hit
    pub assigned_server: String,

    /// Whether the queue and balancer were bypassed
    pub served_from_cache: bool,

    /// Wall-clock latency of this call
    pub processing_time_ms: u64,
}

/// Live counters and gauges for one pipeline instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_size: usize,
    pub queue_size: usize,
}
