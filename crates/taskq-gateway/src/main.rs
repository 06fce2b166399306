//! taskq server: HTTP gateway plus an in-process worker pool.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use taskq_broker::{Broker, BrokerConfig, InMemoryBroker};
use taskq_gateway::{http, reaper, AppState, Config, TaskGateway};
use taskq_worker::{ReportMode, TaskRegistry, WorkerConfig, WorkerPool};

/// taskq task gateway with an in-process worker pool.
#[derive(Parser, Debug)]
#[command(name = "taskq-server", about = "taskq task gateway and worker pool")]
struct Args {
    /// HTTP server address
    #[arg(long, default_value = "127.0.0.1:8000")]
    http_addr: String,

    /// Number of tasks executed concurrently
    #[arg(long, default_value = "4")]
    workers: usize,

    /// Maximum execution time per task, in seconds
    #[arg(long, default_value = "300")]
    task_timeout_secs: u64,

    /// Artificial latency added to built-in tasks, in milliseconds
    #[arg(long, default_value = "0")]
    task_delay_ms: u64,

    /// How long finished results stay readable, in seconds
    #[arg(long, default_value = "86400")]
    result_ttl_secs: u64,

    /// How often expired results are purged, in seconds
    #[arg(long, default_value = "60")]
    purge_interval_secs: u64,

    /// How workers report outcomes: "envelope" or "native"
    #[arg(long, default_value = "envelope")]
    report_mode: ReportMode,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            http_addr: args.http_addr,
            purge_interval: Duration::from_secs(args.purge_interval_secs.max(1)),
            broker: BrokerConfig {
                result_ttl: Duration::from_secs(args.result_ttl_secs),
            },
            worker: WorkerConfig {
                concurrency: args.workers,
                task_timeout: Duration::from_secs(args.task_timeout_secs),
                task_delay: Duration::from_millis(args.task_delay_ms),
                report_mode: args.report_mode,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("taskq=info".parse()?))
        .with_target(true)
        .init();

    let config = Config::from(Args::parse());

    // Shared collaborators, built once
    let broker = Arc::new(InMemoryBroker::new(config.broker.clone()));
    let registry = Arc::new(TaskRegistry::builtin(config.worker.task_delay));
    let shutdown = CancellationToken::new();

    info!(tasks = ?registry.names(), "Task registry loaded");

    // Worker pool
    let pool = Arc::new(WorkerPool::new(
        broker.clone(),
        registry.clone(),
        config.worker.clone(),
    ));
    let pool_handle = tokio::spawn(pool.run(shutdown.clone()));

    // Result reaper
    let reaper_handle = tokio::spawn(reaper::run_result_reaper(
        broker.clone(),
        config.purge_interval,
        shutdown.clone(),
    ));

    // HTTP server
    let gateway = TaskGateway::new(broker.clone(), registry);
    let router = http::create_router(AppState::new(gateway));
    let listener = TcpListener::bind(&config.http_addr).await?;

    info!(
        http_addr = %config.http_addr,
        workers = config.worker.concurrency,
        report_mode = %config.worker.report_mode,
        "Starting taskq server"
    );

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
                _ = server_shutdown.cancelled() => {}
            }
        })
        .await;

    if let Err(e) = &served {
        error!(error = %e, "HTTP server error");
    }

    // Stop workers and background tasks
    broker.close().await;
    shutdown.cancel();
    if let Err(e) = pool_handle.await {
        error!(error = %e, "Worker pool task failed");
    }
    if let Err(e) = reaper_handle.await {
        error!(error = %e, "Result reaper task failed");
    }

    info!("taskq server stopped");
    served?;
    Ok(())
}
