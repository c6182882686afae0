// src/test_utils.rs

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::SystemConfig;
use crate::error::{PipelineError, Result};
use crate::system::{Backend, DistributedSystem, SimulatedBackend, SystemRequest};

/// Builds a request with a deterministic payload for tests
pub fn request(id: &str) -> SystemRequest {
    SystemRequest {
        id: id.to_string(),
        payload: json!({ "body": format!("payload-{}", id) }),
        priority: 1,
        timestamp: None,
    }
}

/// Builds a pipeline over the simulated backend with a small test pool
pub fn test_system() -> DistributedSystem<SimulatedBackend> {
    let config = SystemConfig {
        cache_capacity: 100,
        servers: vec!["alpha".to_string(), "beta".to_string()],
        drain_batch_size: 10,
    };
    DistributedSystem::new(config).expect("test config is valid")
}

/// Backend double that replays a scripted sequence of outcomes and counts
/// how often it was invoked.
///
/// Each scripted entry is interpreted as: `Ok(true)` -> a normal synthesized
/// result, `Ok(false)` -> a falsy result, `Err` -> a backend error. Once the
/// script is exhausted every further call succeeds.
#[derive(Debug, Clone)]
pub struct FlakyBackend {
    script: Arc<Mutex<Vec<Result<bool>>>>,
    invocations: Arc<AtomicUsize>,
}

impl FlakyBackend {
    pub fn new(script: Vec<Result<bool>>) -> Self {
        // Stored reversed so pop() yields the scripted order
        let mut script = script;
        script.reverse();
        Self {
            script: Arc::new(Mutex::new(script)),
            invocations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Next scripted outcome as the boolean-result shape the breaker guards
    pub fn next_outcome(&self) -> Result<bool> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .expect("script lock")
            .pop()
            .unwrap_or(Ok(true))
    }
}

/// Backend double that records every request it handles alongside the
/// server it was attributed to, so tests can inspect what actually reached
/// the backend on each path.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    seen: Arc<Mutex<Vec<(Option<String>, SystemRequest)>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests handled on the drain path (no server attribution), in order
    pub fn drained(&self) -> Vec<SystemRequest> {
        self.seen
            .lock()
            .expect("seen lock")
            .iter()
            .filter(|(server, _)| server.is_none())
            .map(|(_, request)| request.clone())
            .collect()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn handle(&self, request: &SystemRequest, server: Option<&str>) -> Result<Value> {
        self.seen
            .lock()
            .expect("seen lock")
            .push((server.map(str::to_string), request.clone()));
        Ok(json!({ "data": request.payload }))
    }
}

#[async_trait]
impl Backend for FlakyBackend {
    async fn handle(&self, request: &SystemRequest, server: Option<&str>) -> Result<Value> {
        match self.next_outcome() {
            Ok(_) => Ok(json!({
                "data": request.payload,
                "server": server,
            })),
            Err(_) => Err(PipelineError::Backend(format!(
                "scripted failure for request {}",
                request.id
            ))),
        }
    }
}
