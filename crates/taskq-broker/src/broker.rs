//! Broker contract.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use taskq_core::{TaskId, TaskState};

use crate::BrokerError;

/// A unit of work handed to a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub task_id: TaskId,
    pub task_name: String,
    pub args: Value,
}

/// Durable queue and result store, keyed by task id.
///
/// Implementations must be safe to share between the gateway and any number
/// of workers. Each task accepts exactly one terminal write.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Record a pending task and queue it for execution.
    async fn enqueue(&self, task_name: &str, args: Value) -> Result<TaskId, BrokerError>;

    /// Wait for the next job. Returns `None` once the broker is closed and drained.
    async fn dequeue(&self) -> Option<Job>;

    /// Move a task from pending to running.
    async fn mark_running(&self, task_id: &TaskId) -> Result<(), BrokerError>;

    /// Commit a task's return value. The task becomes `Succeeded`.
    async fn store_success(&self, task_id: &TaskId, raw: Value) -> Result<(), BrokerError>;

    /// Commit a failure reported through the native channel. The task becomes `Failed`.
    async fn store_failure(&self, task_id: &TaskId, raw: Value) -> Result<(), BrokerError>;

    /// Current state; `Unknown` for ids never issued or already expired.
    async fn get_state(&self, task_id: &TaskId) -> Result<TaskState, BrokerError>;

    /// Raw stored outcome. Only present once the task is terminal.
    async fn get_outcome(&self, task_id: &TaskId) -> Result<Option<Value>, BrokerError>;

    /// State and raw outcome read together.
    ///
    /// Both come from one snapshot: a terminal state is never paired with a
    /// missing outcome because the record expired in between.
    async fn get_result(
        &self,
        task_id: &TaskId,
    ) -> Result<(TaskState, Option<Value>), BrokerError>;

    /// Drop results older than the configured TTL. Returns how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Number of live records per state.
    async fn counts(&self) -> HashMap<TaskState, usize>;

    /// Stop accepting new work. Queued jobs can still be dequeued.
    async fn close(&self);
}
