// src/system/tests/system_tests.rs

use serde_json::json;

use crate::config::SystemConfig;
use crate::error::PipelineError;
use crate::system::{DistributedSystem, SystemRequest, CACHE_SERVER};
use crate::test_utils::{request, test_system, FlakyBackend, RecordingBackend};

#[test]
fn test_empty_server_pool_is_rejected() {
    let config = SystemConfig {
        servers: Vec::new(),
        ..SystemConfig::default()
    };
    assert!(
        DistributedSystem::new(config).is_err(),
        "An empty server pool should fail at construction"
    );
}

#[test]
fn test_zero_cache_capacity_is_rejected() {
    let config = SystemConfig {
        cache_capacity: 0,
        ..SystemConfig::default()
    };
    assert!(DistributedSystem::new(config).is_err());
}

#[test]
fn test_zero_drain_batch_size_is_rejected() {
    let config = SystemConfig {
        drain_batch_size: 0,
        ..SystemConfig::default()
    };
    assert!(DistributedSystem::new(config).is_err());
}

#[tokio::test]
async fn test_miss_goes_through_queue_and_balancer() {
    let system = test_system();

    let response = system.process_request(request("req-1")).await.unwrap();
    assert_eq!(response.request_id, "req-1");
    assert!(!response.served_from_cache);
    assert_eq!(response.assigned_server, "alpha");

    let metrics = system.metrics().await;
    assert_eq!(metrics.total_requests, 1);
    assert_eq!(metrics.cache_hits, 0);
    assert_eq!(metrics.cache_size, 1, "Miss should cache its result");
    assert_eq!(metrics.queue_size, 1, "Miss should be recorded on the queue");
}

#[tokio::test]
async fn test_same_id_twice_hits_cache_with_identical_result() {
    let system = test_system();

    let first = system.process_request(request("req-7")).await.unwrap();
    let second = system.process_request(request("req-7")).await.unwrap();

    assert!(!first.served_from_cache);
    assert!(second.served_from_cache);
    assert_eq!(second.assigned_server, CACHE_SERVER);
    assert_eq!(
        second.result, first.result,
        "Cached result must match the first response"
    );

    let metrics = system.metrics().await;
    assert_eq!(metrics.total_requests, 2, "Every call counts as a request");
    assert_eq!(metrics.cache_hits, 1, "Exactly the second call is a hit");
    assert_eq!(metrics.queue_size, 1, "Hits bypass the queue");
}

#[tokio::test]
async fn test_misses_rotate_servers_round_robin() {
    let system = test_system();

    let mut servers = Vec::new();
    for i in 0..4 {
        let response = system
            .process_request(request(&format!("req-{}", i)))
            .await
            .unwrap();
        servers.push(response.assigned_server);
    }

    assert_eq!(servers, vec!["alpha", "beta", "alpha", "beta"]);
}

#[tokio::test]
async fn test_process_queue_drains_up_to_batch_size() {
    let config = SystemConfig {
        cache_capacity: 100,
        servers: vec!["alpha".to_string()],
        drain_batch_size: 3,
    };
    let system = DistributedSystem::new(config).unwrap();

    for i in 0..5 {
        system
            .process_request(request(&format!("req-{}", i)))
            .await
            .unwrap();
    }
    assert_eq!(system.metrics().await.queue_size, 5);

    let drained = system.process_queue().await.unwrap();
    assert_eq!(drained, 3, "Drain is capped at the batch size");
    assert_eq!(system.metrics().await.queue_size, 2);

    let drained = system.process_queue().await.unwrap();
    assert_eq!(drained, 2, "Second drain takes the remainder");
    assert_eq!(system.metrics().await.queue_size, 0);

    let drained = system.process_queue().await.unwrap();
    assert_eq!(drained, 0);
}

#[tokio::test]
async fn test_process_queue_does_not_count_requests() {
    let system = test_system();
    system.process_request(request("req-1")).await.unwrap();

    let before = system.metrics().await.total_requests;
    system.process_queue().await.unwrap();
    let after = system.metrics().await.total_requests;

    assert_eq!(
        before, after,
        "Queue draining is maintenance, not request intake"
    );
}

#[tokio::test]
async fn test_enqueued_message_is_timestamped() {
    let backend = RecordingBackend::new();
    let system = DistributedSystem::with_backend(SystemConfig::default(), backend.clone()).unwrap();

    let mut unstamped = request("req-ts");
    unstamped.timestamp = None;
    system.process_request(unstamped).await.unwrap();

    let mut stamped = request("req-ts-2");
    stamped.timestamp = Some(42);
    system.process_request(stamped).await.unwrap();

    system.process_queue().await.unwrap();

    let drained = backend.drained();
    assert_eq!(drained.len(), 2, "Both misses reach the drain path");
    assert!(
        drained[0].timestamp.is_some(),
        "A missing timestamp is stamped on enqueue"
    );
    assert_eq!(
        drained[1].timestamp,
        Some(42),
        "A caller-supplied timestamp is preserved"
    );
}

#[tokio::test]
async fn test_failed_drain_requeues_message_for_retry() {
    let backend = FlakyBackend::new(vec![
        Ok(true),
        Ok(true),
        Err(PipelineError::Backend("down".to_string())),
    ]);
    let system = DistributedSystem::with_backend(SystemConfig::default(), backend).unwrap();

    system.process_request(request("req-a")).await.unwrap();
    system.process_request(request("req-b")).await.unwrap();
    assert_eq!(system.metrics().await.queue_size, 2);

    // First drained call fails; the message goes back to the head
    assert!(system.process_queue().await.is_err());
    assert_eq!(
        system.metrics().await.queue_size,
        2,
        "A failed drain must not lose the in-flight message"
    );

    // Script exhausted, every further call succeeds: the retry drains both
    assert_eq!(system.process_queue().await.unwrap(), 2);
    assert_eq!(system.metrics().await.queue_size, 0);
}

#[tokio::test]
async fn test_cache_eviction_under_load() {
    let config = SystemConfig {
        cache_capacity: 2,
        servers: vec!["alpha".to_string()],
        drain_batch_size: 10,
    };
    let system = DistributedSystem::new(config).unwrap();

    for i in 0..3 {
        system
            .process_request(request(&format!("req-{}", i)))
            .await
            .unwrap();
    }

    // req-0 was evicted, so re-issuing it is a miss again
    let response = system.process_request(request("req-0")).await.unwrap();
    assert!(!response.served_from_cache);

    let metrics = system.metrics().await;
    assert_eq!(metrics.cache_size, 2);
    assert_eq!(metrics.cache_hits, 0);
}

#[tokio::test]
async fn test_independent_systems_do_not_share_state() {
    let system_a = test_system();
    let system_b = test_system();

    system_a.process_request(request("req-1")).await.unwrap();
    system_a.process_request(request("req-1")).await.unwrap();

    let metrics_b = system_b.metrics().await;
    assert_eq!(metrics_b.total_requests, 0);
    assert_eq!(metrics_b.cache_hits, 0);
    assert_eq!(metrics_b.cache_size, 0);
}

#[tokio::test]
async fn test_request_preserves_payload_in_result() {
    let system = test_system();
    let incoming = SystemRequest {
        id: "req-p".to_string(),
        payload: json!({ "answer": 42 }),
        priority: 9,
        timestamp: None,
    };

    let response = system.process_request(incoming).await.unwrap();
    assert_eq!(response.result["data"], json!({ "answer": 42 }));
    assert_eq!(response.result["server"], json!("alpha"));
}
