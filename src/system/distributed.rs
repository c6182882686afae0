// src/system/distributed.rs

use chrono::Utc;
use serde_json::Value;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

use crate::balancer::RoundRobinBalancer;
use crate::cache::LruCache;
use crate::config::SystemConfig;
use crate::error::{PipelineError, Result};
use crate::queue::MessageQueue;
use crate::{component_op, request_event};
use crate::system::{Backend, Metrics, SimulatedBackend, SystemRequest, SystemResponse, CACHE_SERVER};

/// Mutable pipeline state guarded by a single lock.
///
/// Holding the whole state behind one mutex makes each `process_request` a
/// single critical section, so a cache lookup and its follow-up write can
/// never interleave with another request for the same id. Counters are plain
/// fields here rather than globals, so independent systems coexist.
#[derive(Debug)]
struct PipelineState {
    cache: LruCache<Value>,
    queue: MessageQueue<SystemRequest>,
    balancer: RoundRobinBalancer,
    total_requests: u64,
    cache_hits: u64,
}

/// Orchestrator routing requests through cache lookup, queueing, server
/// selection and result caching, while tracking metrics.
#[derive(Debug)]
pub struct DistributedSystem<B: Backend> {
    state: Mutex<PipelineState>,
    backend: B,
    drain_batch_size: usize,
}

impl DistributedSystem<SimulatedBackend> {
    /// Builds a pipeline over the default result-synthesizing backend.
    pub fn new(config: SystemConfig) -> Result<Self> {
        Self::with_backend(config, SimulatedBackend)
    }
}

impl<B: Backend> DistributedSystem<B> {
    /// Builds a pipeline over a caller-supplied backend.
    ///
    /// Rejects an empty server pool, a zero cache capacity and a zero drain
    /// batch size at construction.
    pub fn with_backend(config: SystemConfig, backend: B) -> Result<Self> {
        if config.servers.is_empty() {
            return Err(PipelineError::Config(
                "server pool must not be empty".to_string(),
            ));
        }
        if config.drain_batch_size == 0 {
            return Err(PipelineError::Config(
                "drain batch size must be at least 1".to_string(),
            ));
        }

        let state = PipelineState {
            cache: LruCache::new(config.cache_capacity)?,
            queue: MessageQueue::new(),
            balancer: RoundRobinBalancer::new(config.servers),
            total_requests: 0,
            cache_hits: 0,
        };

        Ok(Self {
            state: Mutex::new(state),
            backend,
            drain_batch_size: config.drain_batch_size,
        })
    }

    /// Routes one request through the pipeline.
    ///
    /// A cache hit bypasses the queue and the balancer entirely. A miss is
    /// enqueued for the maintenance drain path, assigned the next server in
    /// rotation, resolved through the backend and cached under the request
    /// id, so re-issuing the same id yields a hit with the identical result.
    pub async fn process_request(&self, request: SystemRequest) -> Result<SystemResponse> {
        let started = Instant::now();
        let mut state = self.state.lock().await;
        state.total_requests += 1;

        if let Some(cached) = state.cache.get(&request.id) {
            let result = cached.clone();
            state.cache_hits += 1;
            request_event!(request.id.as_str(), CACHE_SERVER, true, 1u64);

            return Ok(SystemResponse {
                request_id: request.id,
                result,
                assigned_server: CACHE_SERVER.to_string(),
                served_from_cache: true,
                // Hits skip all real work; report the nominal 1ms
                processing_time_ms: 1,
            });
        }

        // Miss: record for the audit/drain path before fanning out
        let mut queued = request.clone();
        if queued.timestamp.is_none() {
            queued.timestamp = Some(now_ms());
        }
        state.queue.enqueue(queued);

        let server = state
            .balancer
            .next_server()
            .ok_or_else(|| PipelineError::Internal("no server available".to_string()))?;

        let result = self.backend.handle(&request, Some(&server)).await?;
        state.cache.put(request.id.clone(), result.clone());

        let elapsed_ms = started.elapsed().as_millis() as u64;
        request_event!(request.id.as_str(), server.as_str(), false, elapsed_ms);

        Ok(SystemResponse {
            request_id: request.id,
            result,
            assigned_server: server,
            served_from_cache: false,
            processing_time_ms: elapsed_ms,
        })
    }

    /// Maintenance path: drains up to the configured batch size of queued
    /// messages, synthesizing and caching a result for each. Does not count
    /// toward `total_requests`. Returns the number of messages drained.
    ///
    /// When the backend fails mid-drain the in-flight message is requeued at
    /// the head before the error propagates, so no message is ever lost and
    /// the next pass retries it first.
    pub async fn process_queue(&self) -> Result<usize> {
        let started = Instant::now();
        let mut state = self.state.lock().await;
        let mut processed = 0;

        while processed < self.drain_batch_size {
            let message = match state.queue.dequeue() {
                Some(message) => message,
                None => break,
            };

            // Drained results are not attributed to a server
            let outcome = self.backend.handle(&message, None).await;
            component_op!(
                "queue",
                "drain",
                outcome,
                started.elapsed().as_millis() as u64
            );
            match outcome {
                Ok(result) => {
                    state.cache.put(message.id.clone(), result);
                    processed += 1;
                }
                Err(err) => {
                    // Put the failed message back so the next pass retries it
                    // first; nothing drained so far is undone.
                    state.queue.requeue_front(message);
                    return Err(err);
                }
            }
        }

        debug!(processed, "Drained queued messages");
        Ok(processed)
    }

    /// Snapshot of the live counters and gauges.
    pub async fn metrics(&self) -> Metrics {
        let state = self.state.lock().await;
        Metrics {
            total_requests: state.total_requests,
            cache_hits: state.cache_hits,
            cache_size: state.cache.len(),
            queue_size: state.queue.len(),
        }
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
