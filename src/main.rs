use dotenv::dotenv;
use request_pipeline::config::SystemConfig;
use request_pipeline::{init_logging, DistributedSystem, SystemRequest};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();
    info!("Request pipeline starting up!!");

    let system = DistributedSystem::new(SystemConfig::default())?;

    for i in 0..3 {
        let request = SystemRequest {
            id: format!("demo-{}", i),
            payload: json!({ "body": format!("hello #{}", i) }),
            priority: 1,
            timestamp: None,
        };
        let response = system.process_request(request).await?;
        println!(
            "{} -> {} (cached: {})",
            response.request_id, response.assigned_server, response.served_from_cache
        );
    }

    // Re-issue the first id to show the cache path
    let response = system
        .process_request(SystemRequest {
            id: "demo-0".to_string(),
            payload: json!({ "body": "hello again" }),
            priority: 1,
            timestamp: None,
        })
        .await?;
    println!(
        "demo-0 replay -> {} (cached: {})",
        response.assigned_server, response.served_from_cache
    );

    let drained = system.process_queue().await?;
    let metrics = system.metrics().await;
    info!(
        total_requests = metrics.total_requests,
        cache_hits = metrics.cache_hits,
        drained, "Pipeline demo finished"
    );

    Ok(())
}
