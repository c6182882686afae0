// src/bin/pipeline_bench.rs

use std::sync::Arc;
use std::time::Instant;
use structopt::StructOpt;
use tokio::sync::Barrier;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use indicatif::{ProgressBar, ProgressStyle};
use prettytable::{row, Table};
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use request_pipeline::config::SystemConfig;
use request_pipeline::system::{DistributedSystem, SimulatedBackend};
use request_pipeline::SystemRequest;

#[derive(Debug, Clone, StructOpt)]
#[structopt(
    name = "pipeline_bench",
    about = "A benchmarking tool for the simulated request pipeline"
)]
struct Opt {
    /// Number of concurrent workers to simulate
    #[structopt(short = "u", long, default_value = "10")]
    num_workers: usize,

    /// Number of requests per worker
    #[structopt(short = "r", long, default_value = "100")]
    requests_per_worker: usize,

    /// Number of iterations to run
    #[structopt(short, long, default_value = "3")]
    iterations: usize,

    /// Maximum concurrency level
    #[structopt(short = "c", long, default_value = "100")]
    concurrency: usize,

    /// Fraction of requests drawn from a shared hot id set (drives cache hits)
    #[structopt(long, default_value = "0.5")]
    hot_ratio: f64,

    /// Size of the shared hot id set
    #[structopt(long, default_value = "50")]
    hot_set_size: usize,

    /// Result cache capacity
    #[structopt(long, default_value = "100")]
    cache_capacity: usize,

    /// Backend servers in rotation order
    #[structopt(long, use_delimiter = true, default_value = "server-1,server-2,server-3,server-4")]
    servers: Vec<String>,

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
                "pipeline_bench={},request_pipeline={}",
                log_level, log_level
            )))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    } else {
        // Set up minimal logging (errors only)
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(
                "pipeline_bench=error,request_pipeline=error",
            ))
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
    }

    run_benchmark(opt).await
}

async fn run_benchmark(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    println!("\nRunning pipeline benchmark");
    println!("==========================");

    let total_per_iteration = opt.num_workers * opt.requests_per_worker;
    let mut results = Vec::with_capacity(opt.iterations);

    for iteration in 0..opt.iterations {
        if !opt.disable_logs {
            info!("Starting iteration {} of {}", iteration + 1, opt.iterations);
        }

        // Fresh pipeline and hot set per iteration
        let config = SystemConfig {
            cache_capacity: opt.cache_capacity,
            servers: opt.servers.clone(),
            drain_batch_size: 10,
        };
        let system = Arc::new(DistributedSystem::new(config)?);
        let hot_ids: Arc<Vec<String>> = Arc::new(
            (0..opt.hot_set_size.max(1))
                .map(|_| Uuid::new_v4().to_string())
                .collect(),
        );

        let progress = ProgressBar::new(total_per_iteration as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("progress template is valid"),
        );

        let start_time = Instant::now();

        // Create a barrier to start all workers at once
        let barrier = Arc::new(Barrier::new(opt.num_workers));
        let concurrency_semaphore = Arc::new(tokio::sync::Semaphore::new(opt.concurrency));
        let mut handles = Vec::with_capacity(opt.num_workers);

        for worker_id in 0..opt.num_workers {
            let system = Arc::clone(&system);
            let barrier = Arc::clone(&barrier);
            let semaphore = Arc::clone(&concurrency_semaphore);
            let hot_ids = Arc::clone(&hot_ids);
            let progress = progress.clone();
            let requests_per_worker = opt.requests_per_worker;
            let hot_ratio = opt.hot_ratio;
            let disable_logs = opt.disable_logs;

            let handle = tokio::spawn(async move {
                // Wait for all workers to be ready
                barrier.wait().await;

                let mut hits = 0u64;
                let mut misses = 0u64;

                for i in 0..requests_per_worker {
                    // Limit concurrency
                    let _permit = semaphore.acquire().await.expect("semaphore open");

                    let id = {
                        let mut rng = rand::rng();
                        if rng.random::<f64>() < hot_ratio {
                            hot_ids[rng.random_range(0..hot_ids.len())].clone()
                        } else {
                            Uuid::new_v4().to_string()
                        }
                    };

                    let request = SystemRequest {
                        id,
                        payload: json!({ "worker": worker_id, "seq": i }),
                        priority: 1,
                        timestamp: None,
                    };

                    match system.process_request(request).await {
                        Ok(response) => {
                            if response.served_from_cache {
                                hits += 1;
                            } else {
                                misses += 1;
                            }
                        }
                        Err(e) => {
                            if !disable_logs {
                                warn!("Request failed: {}", e);
                            }
                        }
                    }

                    progress.inc(1);
                }

                (hits, misses)
            });

            handles.push(handle);
        }

        // Wait for all workers to complete
        let worker_results = futures::future::join_all(handles).await;
        progress.finish_and_clear();

        let mut iteration_hits = 0u64;
        let mut iteration_misses = 0u64;
        for result in worker_results {
            if let Ok((hits, misses)) = result {
                iteration_hits += hits;
                iteration_misses += misses;
            }
        }

        // Drain whatever the intake path queued up
        let mut drained = 0;
        loop {
            let batch = system.process_queue().await?;
            drained += batch;
            if batch == 0 {
                break;
            }
        }

        let elapsed = start_time.elapsed();
        let total = iteration_hits + iteration_misses;
        let throughput = total as f64 / elapsed.as_secs_f64();

        println!(
            "Iteration {}: {:?}, {} hits, {} misses, {} drained, {:.2} req/sec",
            iteration + 1,
            elapsed,
            iteration_hits,
            iteration_misses,
            drained,
            throughput
        );

        let metrics = system.metrics().await;
        results.push((elapsed, iteration_hits, iteration_misses, metrics));
    }

    // Summarize across iterations
    let mut table = Table::new();
    table.add_row(row![
        "Iteration",
        "Duration",
        "Hits",
        "Misses",
        "Hit rate",
        "Total requests"
    ]);
    for (i, (elapsed, hits, misses, metrics)) in results.iter().enumerate() {
        let total = hits + misses;
        let hit_rate = if total > 0 {
            100.0 * *hits as f64 / total as f64
        } else {
            0.0
        };
        table.add_row(row![
            i + 1,
            format!("{:?}", elapsed),
            hits,
            misses,
            format!("{:.1}%", hit_rate),
            metrics.total_requests
        ]);
    }
    table.printstd();

    Ok(())
}
