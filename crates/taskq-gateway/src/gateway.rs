//! Task submission and status.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use taskq_broker::{Broker, BrokerError};
use taskq_core::{envelope, StructuredError, TaskId, TaskOutcome, TaskRequest, TaskState};
use taskq_worker::TaskRegistry;

/// Gateway errors. Task failures are not errors here; they are reported as data.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Task '{0}' is not registered")]
    UnknownTask(String),

    #[error("Broker error: {0}")]
    Broker(#[from] BrokerError),
}

/// Status of one task as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatusView {
    pub task_id: TaskId,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StructuredError>,
}

impl TaskStatusView {
    fn bare(task_id: TaskId, state: TaskState) -> Self {
        Self {
            task_id,
            state,
            result: None,
            error: None,
        }
    }

    fn from_outcome(task_id: TaskId, outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Success(value) => Self {
                task_id,
                state: TaskState::Succeeded,
                result: Some(value),
                error: None,
            },
            TaskOutcome::Failure(err) => Self {
                task_id,
                state: TaskState::Failed,
                result: None,
                error: Some(err),
            },
        }
    }
}

/// Front door for submitting tasks and reading their status.
///
/// Holds no state of its own; everything lives in the broker.
#[derive(Clone)]
pub struct TaskGateway {
    broker: Arc<dyn Broker>,
    registry: Arc<TaskRegistry>,
}

impl TaskGateway {
    /// Create a new TaskGateway.
    pub fn new(broker: Arc<dyn Broker>, registry: Arc<TaskRegistry>) -> Self {
        Self { broker, registry }
    }

    /// Queue a typed task. Returns as soon as the task is enqueued.
    pub async fn submit(&self, request: &TaskRequest) -> Result<TaskId, GatewayError> {
        self.submit_named(request.task_name(), request.args()).await
    }

    /// Queue a task by registered name.
    pub async fn submit_named(&self, task_name: &str, args: Value) -> Result<TaskId, GatewayError> {
        if !self.registry.contains(task_name) {
            warn!(task = %task_name, "Rejected submission of unregistered task");
            return Err(GatewayError::UnknownTask(task_name.to_string()));
        }

        let task_id = self.broker.enqueue(task_name, args).await?;
        info!(task_id = %task_id, task = %task_name, "Task submitted");
        Ok(task_id)
    }

    /// Current status of a task, with its result or error once finished.
    pub async fn status(&self, task_id: &TaskId) -> Result<TaskStatusView, GatewayError> {
        let (state, raw) = self.broker.get_result(task_id).await?;
        if !state.is_terminal() {
            debug!(task_id = %task_id, state = %state, "Task not finished");
            return Ok(TaskStatusView::bare(task_id.clone(), state));
        }

        let outcome = match raw {
            Some(raw) => envelope::decode_stored(state, &raw),
            None => {
                warn!(task_id = %task_id, state = %state, "Finished task has no stored outcome");
                TaskOutcome::Failure(StructuredError::internal(
                    "Task finished without a stored outcome",
                ))
            }
        };
        Ok(TaskStatusView::from_outcome(task_id.clone(), outcome))
    }

    /// Live task count per state.
    pub async fn counts(&self) -> std::collections::HashMap<TaskState, usize> {
        self.broker.counts().await
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use taskq_broker::{BrokerConfig, InMemoryBroker};
    use taskq_core::ErrorKind;
    use taskq_worker::{ReportMode, WorkerConfig, WorkerPool};

    struct Harness {
        broker: Arc<InMemoryBroker>,
        gateway: TaskGateway,
        pool: WorkerPool,
    }

    fn harness(report_mode: ReportMode) -> Harness {
        harness_with(BrokerConfig::default(), report_mode)
    }

    fn harness_with(broker_config: BrokerConfig, report_mode: ReportMode) -> Harness {
        let broker = Arc::new(InMemoryBroker::new(broker_config));
        let registry = Arc::new(TaskRegistry::builtin(Duration::ZERO));
        let gateway = TaskGateway::new(broker.clone(), registry.clone());
        let pool = WorkerPool::new(
            broker.clone(),
            registry,
            WorkerConfig {
                report_mode,
                ..WorkerConfig::default()
            },
        );
        Harness {
            broker,
            gateway,
            pool,
        }
    }

    impl Harness {
        async fn run_one(&self) {
            self.pool.process_next().await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_add_is_pending_then_succeeds() {
        let h = harness(ReportMode::Envelope);
        let id = h.gateway.submit(&TaskRequest::add(2, 3)).await.unwrap();

        let view = h.gateway.status(&id).await.unwrap();
        assert_eq!(view.state, TaskState::Pending);
        assert!(view.result.is_none());
        assert!(view.error.is_none());

        h.run_one().await;

        let view = h.gateway.status(&id).await.unwrap();
        assert_eq!(view.state, TaskState::Succeeded);
        assert_eq!(view.result, Some(json!(5)));
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_running_task_has_no_result() {
        let h = harness(ReportMode::Envelope);
        let id = h.gateway.submit(&TaskRequest::add(1, 1)).await.unwrap();
        h.broker.mark_running(&id).await.unwrap();

        let view = h.gateway.status(&id).await.unwrap();
        assert_eq!(view, TaskStatusView::bare(id, TaskState::Running));
    }

    #[tokio::test]
    async fn test_missing_path_fails_with_path_not_found() {
        for mode in [ReportMode::Envelope, ReportMode::Native] {
            let h = harness(mode);
            let id = h
                .gateway
                .submit(&TaskRequest::process_file("/nonexistent"))
                .await
                .unwrap();
            h.run_one().await;

            let view = h.gateway.status(&id).await.unwrap();
            assert_eq!(view.state, TaskState::Failed, "mode = {mode}");
            assert!(view.result.is_none());
            assert_eq!(
                serde_json::to_value(view.error.unwrap()).unwrap(),
                json!({
                    "kind": "PATH_NOT_FOUND",
                    "message": "Path does not exist: /nonexistent",
                    "details": {"path": "/nonexistent"}
                })
            );
        }
    }

    #[tokio::test]
    async fn test_directory_fails_with_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();

        let h = harness(ReportMode::Envelope);
        let id = h
            .gateway
            .submit(&TaskRequest::process_file(path.clone()))
            .await
            .unwrap();
        h.run_one().await;

        let view = h.gateway.status(&id).await.unwrap();
        assert_eq!(view.state, TaskState::Failed);
        let err = view.error.unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.details()["path"], json!(path));
    }

    #[tokio::test]
    async fn test_regular_file_succeeds_with_size() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("input.bin");
        std::fs::write(&file, vec![0u8; 1234]).unwrap();
        let path = file.to_string_lossy().to_string();

        for mode in [ReportMode::Envelope, ReportMode::Native] {
            let h = harness(mode);
            let id = h
                .gateway
                .submit(&TaskRequest::process_file(path.clone()))
                .await
                .unwrap();
            h.run_one().await;

            let view = h.gateway.status(&id).await.unwrap();
            assert_eq!(view.state, TaskState::Succeeded, "mode = {mode}");
            assert_eq!(
                view.result,
                Some(json!({"path": path, "size": 1234, "processed": true}))
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_id_reports_unknown() {
        let h = harness(ReportMode::Envelope);
        let view = h.gateway.status(&TaskId::new("no-such-task")).await.unwrap();
        assert_eq!(
            view,
            TaskStatusView::bare(TaskId::new("no-such-task"), TaskState::Unknown)
        );
    }

    #[tokio::test]
    async fn test_expired_result_reports_unknown() {
        let h = harness_with(
            BrokerConfig {
                result_ttl: Duration::ZERO,
            },
            ReportMode::Envelope,
        );
        let id = h.gateway.submit(&TaskRequest::add(2, 3)).await.unwrap();
        h.run_one().await;

        let view = h.gateway.status(&id).await.unwrap();
        assert_eq!(view.state, TaskState::Unknown);
        assert!(view.result.is_none());
    }

    /// Answers `get_state` from the raw record, ignoring expiry, the way a
    /// reader racing the reaper would see it.
    struct StaleStateBroker(Arc<InMemoryBroker>);

    #[async_trait::async_trait]
    impl Broker for StaleStateBroker {
        async fn enqueue(&self, task_name: &str, args: Value) -> Result<TaskId, BrokerError> {
            self.0.enqueue(task_name, args).await
        }

        async fn dequeue(&self) -> Option<taskq_broker::Job> {
            self.0.dequeue().await
        }

        async fn mark_running(&self, task_id: &TaskId) -> Result<(), BrokerError> {
            self.0.mark_running(task_id).await
        }

        async fn store_success(&self, task_id: &TaskId, raw: Value) -> Result<(), BrokerError> {
            self.0.store_success(task_id, raw).await
        }

        async fn store_failure(&self, task_id: &TaskId, raw: Value) -> Result<(), BrokerError> {
            self.0.store_failure(task_id, raw).await
        }

        async fn get_state(&self, task_id: &TaskId) -> Result<TaskState, BrokerError> {
            Ok(self
                .0
                .record(task_id)
                .await
                .map_or(TaskState::Unknown, |record| record.state))
        }

        async fn get_outcome(&self, task_id: &TaskId) -> Result<Option<Value>, BrokerError> {
            self.0.get_outcome(task_id).await
        }

        async fn get_result(
            &self,
            task_id: &TaskId,
        ) -> Result<(TaskState, Option<Value>), BrokerError> {
            self.0.get_result(task_id).await
        }

        async fn purge_expired(&self) -> usize {
            self.0.purge_expired().await
        }

        async fn counts(&self) -> std::collections::HashMap<TaskState, usize> {
            self.0.counts().await
        }

        async fn close(&self) {
            self.0.close().await
        }
    }

    #[tokio::test]
    async fn test_result_expiring_mid_read_reports_unknown() {
        let h = harness_with(
            BrokerConfig {
                result_ttl: Duration::ZERO,
            },
            ReportMode::Envelope,
        );
        let id = h.gateway.submit(&TaskRequest::add(2, 3)).await.unwrap();
        h.run_one().await;

        let racing = StaleStateBroker(h.broker.clone());
        assert_eq!(racing.get_state(&id).await.unwrap(), TaskState::Succeeded);
        assert_eq!(racing.get_outcome(&id).await.unwrap(), None);

        let registry = Arc::new(TaskRegistry::builtin(Duration::ZERO));
        let gateway = TaskGateway::new(Arc::new(racing), registry);
        let view = gateway.status(&id).await.unwrap();
        assert_eq!(view, TaskStatusView::bare(id, TaskState::Unknown));
    }

    #[tokio::test]
    async fn test_degraded_native_failure_is_decoded() {
        let h = harness(ReportMode::Native);
        let id = h.gateway.submit(&TaskRequest::add(1, 2)).await.unwrap();
        h.broker.mark_running(&id).await.unwrap();
        h.broker
            .store_failure(&id, json!(["TASK_FAILED", "worker lost", null]))
            .await
            .unwrap();

        let view = h.gateway.status(&id).await.unwrap();
        assert_eq!(view.state, TaskState::Failed);
        assert_eq!(view.error, Some(StructuredError::task_failed("worker lost")));
    }

    #[tokio::test]
    async fn test_unregistered_task_is_rejected() {
        let h = harness(ReportMode::Envelope);
        let err = h
            .gateway
            .submit_named("multiply", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnknownTask(name) if name == "multiply"));
    }

    #[test]
    fn test_pending_view_serializes_without_result_or_error() {
        let view = TaskStatusView::bare(TaskId::new("t1"), TaskState::Pending);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({"task_id": "t1", "state": "PENDING"})
        );
    }
}
