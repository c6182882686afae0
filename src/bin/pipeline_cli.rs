// src/bin/pipeline_cli.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use structopt::StructOpt;
use tokio::time;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use prettytable::{row, Table};
use rand::Rng;
use serde_json::json;

use request_pipeline::config::SystemConfig;
use request_pipeline::system::{DistributedSystem, SimulatedBackend};
use request_pipeline::SystemRequest;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pipeline_cli",
    about = "A CLI for driving the simulated request pipeline"
)]
struct Opt {
    /// Simulation mode
    #[structopt(long, possible_values = &["burst", "steady", "custom"], default_value = "burst")]
    simulation: String,

    /// Number of requests to simulate
    #[structopt(short = "n", long, default_value = "20")]
    num_requests: usize,

    /// Time between requests in milliseconds (for steady mode)
    #[structopt(short = "t", long, default_value = "100")]
    request_interval_ms: u64,

    /// Fraction of requests reusing an already-issued id (drives cache hits)
    #[structopt(short, long, default_value = "0.3")]
    duplicate_ratio: f64,

    /// Backend servers in rotation order
    #[structopt(long, use_delimiter = true, default_value = "server-1,server-2,server-3,server-4")]
    servers: Vec<String>,

    /// Result cache capacity
    #[structopt(long, default_value = "100")]
    cache_capacity: usize,

    /// Queue drain batch size
    #[structopt(long, default_value = "10")]
    drain_batch_size: usize,

    /// Drain the queue once the simulation finishes
    #[structopt(long)]
    drain: bool,

    /// Verbosity level
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// Disable logs
    #[structopt(long)]
    disable_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let opt = Opt::from_args();

    // Set up logging based on disable_logs flag
    if !opt.disable_logs {
        let log_level = match opt.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(format!(
                "pipeline_cli={},request_pipeline={}",
                log_level, log_level
            )))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    } else {
        // Set up minimal logging (errors only)
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("pipeline_cli=error,request_pipeline=error"))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }

    let config = SystemConfig {
        cache_capacity: opt.cache_capacity,
        servers: opt.servers.clone(),
        drain_batch_size: opt.drain_batch_size,
    };
    let system = DistributedSystem::new(config)?;

    if !opt.disable_logs {
        info!(
            "Starting pipeline CLI: {} requests over {} servers",
            opt.num_requests,
            opt.servers.len()
        );
    }

    match opt.simulation.as_str() {
        "burst" => simulate_burst(&opt, &system).await?,
        "steady" => simulate_steady(&opt, &system).await?,
        "custom" => simulate_custom(&opt, &system).await?,
        other => {
            return Err(format!("Unknown simulation mode: {}", other).into());
        }
    }

    if opt.drain {
        let mut total_drained = 0;
        loop {
            let drained = system.process_queue().await?;
            total_drained += drained;
            if drained == 0 {
                break;
            }
        }
        println!("Drained {} queued messages", total_drained);
    }

    print_metrics(&system).await;
    Ok(())
}

fn build_request(index: usize, opt: &Opt) -> SystemRequest {
    // Reuse an earlier id with probability duplicate_ratio
    let mut rng = rand::rng();
    let id = if index > 0 && rng.random::<f64>() < opt.duplicate_ratio {
        format!("req-{}", rng.random_range(0..index))
    } else {
        format!("req-{}", index)
    };

    SystemRequest {
        id,
        payload: json!({ "body": format!("message #{}", index) }),
        priority: rng.random_range(1..=5),
        timestamp: None,
    }
}

// Fire all requests back to back
async fn simulate_burst(
    opt: &Opt,
    system: &DistributedSystem<SimulatedBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut hits = 0;
    let mut misses = 0;
    let start_time = Instant::now();

    for i in 0..opt.num_requests {
        let response = system.process_request(build_request(i, opt)).await?;

        if response.served_from_cache {
            hits += 1;
            if !opt.disable_logs {
                info!("Request {}: HIT (id: {})", i + 1, response.request_id);
            }
        } else {
            misses += 1;
            if !opt.disable_logs {
                info!(
                    "Request {}: MISS -> {} (id: {})",
                    i + 1,
                    response.assigned_server,
                    response.request_id
                );
            }
        }
    }

    let elapsed = start_time.elapsed();

    println!("\nBurst Simulation Results:");
    println!("-------------------------");
    println!("Total requests: {}", opt.num_requests);
    println!("Cache hits: {}", hits);
    println!("Cache misses: {}", misses);
    println!("Time elapsed: {:?}", elapsed);

    Ok(())
}

// Fire requests with a fixed interval between them
async fn simulate_steady(
    opt: &Opt,
    system: &DistributedSystem<SimulatedBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_millis(opt.request_interval_ms);
    let mut hits = 0;
    let mut misses = 0;
    let start_time = Instant::now();

    for i in 0..opt.num_requests {
        let request_time = Instant::now();
        let response = system.process_request(build_request(i, opt)).await?;

        if response.served_from_cache {
            hits += 1;
        } else {
            misses += 1;
        }
        if !opt.disable_logs {
            info!(
                "Request {}: {} ({}ms)",
                i + 1,
                if response.served_from_cache { "HIT" } else { "MISS" },
                response.processing_time_ms
            );
        }

        // Calculate how long to wait before next request
        let elapsed = request_time.elapsed();
        if elapsed < interval {
            time::sleep(interval - elapsed).await;
        }
    }

    let elapsed = start_time.elapsed();

    println!("\nSteady Simulation Results:");
    println!("---------------------------");
    println!("Total requests: {}", opt.num_requests);
    println!("Cache hits: {}", hits);
    println!("Cache misses: {}", misses);
    println!("Time elapsed: {:?}", elapsed);

    Ok(())
}

// Interactive mode: one request per line of input
async fn simulate_custom(
    opt: &Opt,
    system: &DistributedSystem<SimulatedBackend>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !opt.disable_logs {
        info!("Starting custom interactive simulation");
    }

    println!("\nCustom Simulation Mode");
    println!("----------------------");
    println!("Type a request id and press Enter ('quit' or Ctrl-C to exit)");

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let mut hits = 0;
    let mut misses = 0;
    let mut input_buffer = String::new();

    while running.load(Ordering::SeqCst) {
        input_buffer.clear();
        if std::io::stdin().read_line(&mut input_buffer)? == 0 {
            break;
        }

        let trimmed = input_buffer.trim();
        if trimmed == "quit" || trimmed == "exit" || trimmed == "q" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let request = SystemRequest {
            id: trimmed.to_string(),
            payload: json!({ "body": "interactive" }),
            priority: 1,
            timestamp: None,
        };

        match system.process_request(request).await {
            Ok(response) => {
                if response.served_from_cache {
                    hits += 1;
                    println!("HIT (server: {})", response.assigned_server);
                } else {
                    misses += 1;
                    println!("MISS (server: {})", response.assigned_server);
                }
            }
            Err(e) => warn!("Request failed: {}", e),
        }
    }

    println!("\nCustom Simulation Results:");
    println!("--------------------------");
    println!("Cache hits: {}", hits);
    println!("Cache misses: {}", misses);

    Ok(())
}

async fn print_metrics(system: &DistributedSystem<SimulatedBackend>) {
    let metrics = system.metrics().await;

    let mut table = Table::new();
    table.add_row(row!["Metric", "Value"]);
    table.add_row(row!["Total requests", metrics.total_requests]);
    table.add_row(row!["Cache hits", metrics.cache_hits]);
    table.add_row(row!["Cache size", metrics.cache_size]);
    table.add_row(row!["Queue size", metrics.queue_size]);
    table.printstd();
}
