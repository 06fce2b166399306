//! In-process broker.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, info};

use taskq_core::{TaskId, TaskState};

use crate::{Broker, BrokerConfig, BrokerError, Job, TaskRecord};

/// Broker backed by a tokio channel and an in-memory record map.
pub struct InMemoryBroker {
    config: BrokerConfig,

    /// Task records indexed by TaskId.
    records: RwLock<HashMap<TaskId, TaskRecord>>,

    /// Sending half of the job queue; `None` once closed.
    queue_tx: RwLock<Option<mpsc::UnboundedSender<Job>>>,

    /// Receiving half, shared by all workers.
    queue_rx: Mutex<mpsc::UnboundedReceiver<Job>>,
}

impl InMemoryBroker {
    pub fn new(config: BrokerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            records: RwLock::new(HashMap::new()),
            queue_tx: RwLock::new(Some(tx)),
            queue_rx: Mutex::new(rx),
        }
    }

    /// Snapshot of a record, including expired ones not yet purged.
    pub async fn record(&self, task_id: &TaskId) -> Option<TaskRecord> {
        self.records.read().await.get(task_id).cloned()
    }

    async fn finish(
        &self,
        task_id: &TaskId,
        state: TaskState,
        raw: Value,
    ) -> Result<(), BrokerError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(task_id)
            .ok_or_else(|| BrokerError::TaskNotFound(task_id.clone()))?;

        if record.state.is_terminal() {
            return Err(BrokerError::AlreadyCompleted(task_id.clone()));
        }
        record.state =
            record
                .state
                .transition(state)
                .map_err(|source| BrokerError::InvalidTransition {
                    task_id: task_id.clone(),
                    source,
                })?;
        record.outcome = Some(raw);
        record.finished_at = Some(Utc::now());

        debug!(task_id = %task_id, state = %state, "Stored task outcome");
        Ok(())
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn enqueue(&self, task_name: &str, args: Value) -> Result<TaskId, BrokerError> {
        let queue_tx = self.queue_tx.read().await;
        let tx = queue_tx.as_ref().ok_or(BrokerError::Closed)?;

        let task_id = TaskId::generate();
        let record = TaskRecord::new(task_id.clone(), task_name, args.clone());
        self.records.write().await.insert(task_id.clone(), record);

        let job = Job {
            task_id: task_id.clone(),
            task_name: task_name.to_string(),
            args,
        };
        if tx.send(job).is_err() {
            self.records.write().await.remove(&task_id);
            return Err(BrokerError::Closed);
        }

        debug!(task_id = %task_id, task = %task_name, "Enqueued task");
        Ok(task_id)
    }

    async fn dequeue(&self) -> Option<Job> {
        self.queue_rx.lock().await.recv().await
    }

    async fn mark_running(&self, task_id: &TaskId) -> Result<(), BrokerError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(task_id)
            .ok_or_else(|| BrokerError::TaskNotFound(task_id.clone()))?;

        if record.state.is_terminal() {
            return Err(BrokerError::AlreadyCompleted(task_id.clone()));
        }
        record.state = record
            .state
            .transition(TaskState::Running)
            .map_err(|source| BrokerError::InvalidTransition {
                task_id: task_id.clone(),
                source,
            })?;
        record.started_at = Some(Utc::now());
        Ok(())
    }

    async fn store_success(&self, task_id: &TaskId, raw: Value) -> Result<(), BrokerError> {
        self.finish(task_id, TaskState::Succeeded, raw).await
    }

    async fn store_failure(&self, task_id: &TaskId, raw: Value) -> Result<(), BrokerError> {
        self.finish(task_id, TaskState::Failed, raw).await
    }

    async fn get_state(&self, task_id: &TaskId) -> Result<TaskState, BrokerError> {
        let records = self.records.read().await;
        let state = match records.get(task_id) {
            Some(record) if record.is_expired(Utc::now(), self.config.result_ttl) => {
                TaskState::Unknown
            }
            Some(record) => record.state,
            None => TaskState::Unknown,
        };
        Ok(state)
    }

    async fn get_outcome(&self, task_id: &TaskId) -> Result<Option<Value>, BrokerError> {
        let records = self.records.read().await;
        let outcome = records
            .get(task_id)
            .filter(|record| !record.is_expired(Utc::now(), self.config.result_ttl))
            .and_then(|record| record.outcome.clone());
        Ok(outcome)
    }

    async fn get_result(
        &self,
        task_id: &TaskId,
    ) -> Result<(TaskState, Option<Value>), BrokerError> {
        let now = Utc::now();
        let records = self.records.read().await;
        let result = match records.get(task_id) {
            Some(record) if !record.is_expired(now, self.config.result_ttl) => {
                (record.state, record.outcome.clone())
            }
            _ => (TaskState::Unknown, None),
        };
        Ok(result)
    }

    async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now, self.config.result_ttl));
        let purged = before - records.len();
        if purged > 0 {
            info!(purged, remaining = records.len(), "Purged expired task results");
        }
        purged
    }

    async fn counts(&self) -> HashMap<TaskState, usize> {
        let now = Utc::now();
        let records = self.records.read().await;
        let mut counts = HashMap::new();
        for record in records.values() {
            if record.is_expired(now, self.config.result_ttl) {
                continue;
            }
            *counts.entry(record.state).or_insert(0) += 1;
        }
        counts
    }

    async fn close(&self) {
        if self.queue_tx.write().await.take().is_some() {
            info!("Broker closed to new work");
        }
    }
}
