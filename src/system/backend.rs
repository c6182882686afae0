// src/system/backend.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::fmt::Debug;

use crate::error::Result;
use crate::system::SystemRequest;

/// Seam between the orchestrator and whatever produces request results.
///
/// The reference pipeline never talks to a real server; it synthesizes
/// results in-process. Keeping the synthesis behind a trait lets tests swap
/// in failing or counting backends without touching the orchestrator.
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Produce the result payload for a request.
    ///
    /// `server` is the balancer's pick for intake-path requests and `None`
    /// for queue drains, which are not attributed to a server.
    async fn handle(&self, request: &SystemRequest, server: Option<&str>) -> Result<Value>;
}

/// Default backend: synthesizes a result from the request payload
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend;

#[async_trait]
impl Backend for SimulatedBackend {
    async fn handle(&self, request: &SystemRequest, server: Option<&str>) -> Result<Value> {
        let mut result = json!({
            "data": request.payload,
            "processed_at": Utc::now().to_rfc3339(),
        });

        if let Some(server) = server {
            result["server"] = Value::String(server.to_string());
        }

        Ok(result)
    }
}
