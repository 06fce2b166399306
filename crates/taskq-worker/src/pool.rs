//! Worker pool: pulls jobs from the broker, executes them, commits outcomes.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use taskq_broker::{Broker, BrokerError, Job};
use taskq_core::{envelope, TaskId, TaskOutcome};

use crate::config::{ReportMode, WorkerConfig};
use crate::executor::TaskExecutor;
use crate::registry::TaskRegistry;

/// A set of workers sharing one broker and one registry.
pub struct WorkerPool {
    broker: Arc<dyn Broker>,
    executor: TaskExecutor,
    config: WorkerConfig,
}

impl WorkerPool {
    /// Create a new WorkerPool.
    pub fn new(broker: Arc<dyn Broker>, registry: Arc<TaskRegistry>, config: WorkerConfig) -> Self {
        let executor = TaskExecutor::new(registry, config.task_timeout);
        Self {
            broker,
            executor,
            config,
        }
    }

    /// Run `concurrency` workers until `shutdown` fires or the broker closes.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let concurrency = self.config.concurrency.max(1);
        info!(
            concurrency,
            report_mode = %self.config.report_mode,
            "Starting worker pool"
        );

        let mut workers = JoinSet::new();
        for worker in 0..concurrency {
            let pool = self.clone();
            let shutdown = shutdown.clone();
            workers.spawn(async move { pool.worker_loop(worker, shutdown).await });
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Worker task ended abnormally");
            }
        }

        info!("Worker pool stopped");
    }

    async fn worker_loop(&self, worker: usize, shutdown: CancellationToken) {
        debug!(worker, "Worker started");
        loop {
            let job = tokio::select! {
                _ = shutdown.cancelled() => break,
                job = self.broker.dequeue() => job,
            };
            let Some(job) = job else {
                break;
            };

            let task_id = job.task_id.clone();
            if let Err(e) = self.process_job(job).await {
                warn!(worker, task_id = %task_id, error = %e, "Failed to process job");
            }
        }
        debug!(worker, "Worker exiting");
    }

    /// Take one job off the queue and process it.
    ///
    /// Returns `None` when the broker is closed and drained.
    pub async fn process_next(&self) -> Option<Result<TaskOutcome, BrokerError>> {
        let job = self.broker.dequeue().await?;
        Some(self.process_job(job).await)
    }

    /// Execute one job and commit exactly one outcome for it.
    pub async fn process_job(&self, job: Job) -> Result<TaskOutcome, BrokerError> {
        let Job {
            task_id,
            task_name,
            args,
        } = job;

        self.broker.mark_running(&task_id).await?;
        info!(task_id = %task_id, task = %task_name, "Task started");

        let outcome = self.executor.execute(&task_name, args).await;
        self.commit(&task_id, &outcome).await?;

        info!(
            task_id = %task_id,
            success = outcome.is_success(),
            "Task outcome committed"
        );
        Ok(outcome)
    }

    async fn commit(&self, task_id: &TaskId, outcome: &TaskOutcome) -> Result<(), BrokerError> {
        // Successes are always enveloped so a payload that looks like an
        // envelope is never mistaken for one.
        match (self.config.report_mode, outcome) {
            (ReportMode::Native, TaskOutcome::Failure(err)) => {
                self.broker
                    .store_failure(task_id, envelope::encode_native_failure(err))
                    .await
            }
            _ => {
                self.broker
                    .store_success(task_id, envelope::encode(outcome))
                    .await
            }
        }
    }
}
