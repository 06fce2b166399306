//! Task execution boundary.
//!
//! Every unit of work runs through [`TaskExecutor::execute`], which always
//! yields a [`TaskOutcome`]. Handler errors, panics and timeouts are all turned
//! into structured failures here, before anything reaches the broker.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::task::JoinError;
use tracing::{info, warn};

use taskq_core::{Details, ErrorKind, StructuredError, TaskOutcome};

use crate::registry::{BoxError, TaskRegistry};

/// Runs registered units of work.
#[derive(Clone)]
pub struct TaskExecutor {
    registry: Arc<TaskRegistry>,
    timeout: Duration,
}

impl TaskExecutor {
    /// Create an executor over the given registry.
    pub fn new(registry: Arc<TaskRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Execute a task by name.
    ///
    /// The handler runs in its own tokio task so that a panic is contained
    /// and reported as `INTERNAL_ERROR`.
    pub async fn execute(&self, task_name: &str, args: Value) -> TaskOutcome {
        let Some(handler) = self.registry.get(task_name) else {
            warn!(task = %task_name, "Unknown task requested");
            return TaskOutcome::Failure(unknown_task(task_name));
        };

        info!(task = %task_name, "Starting task execution");

        let mut handle = tokio::spawn(async move { handler.run(args).await });
        let outcome = match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(result)) => TaskOutcome::from(result.map_err(into_structured)),
            Ok(Err(join_err)) => TaskOutcome::Failure(from_join_error(join_err)),
            Err(_elapsed) => {
                handle.abort();
                TaskOutcome::Failure(timed_out(self.timeout))
            }
        };

        match &outcome {
            TaskOutcome::Success(_) => info!(task = %task_name, "Task succeeded"),
            TaskOutcome::Failure(err) => warn!(
                task = %task_name,
                kind = %err.kind(),
                error = %err.message(),
                "Task failed"
            ),
        }
        outcome
    }
}

/// Keep a structured error as-is; wrap anything else as `INTERNAL_ERROR`.
pub fn into_structured(err: BoxError) -> StructuredError {
    match err.downcast::<StructuredError>() {
        Ok(structured) => *structured,
        Err(other) => StructuredError::internal(other.to_string()),
    }
}

fn unknown_task(task_name: &str) -> StructuredError {
    let mut details = Details::new();
    details.insert("task_name".to_string(), Value::String(task_name.to_string()));
    StructuredError::invalid_input(format!("Unknown task: {task_name}"), Some(details))
}

fn timed_out(timeout: Duration) -> StructuredError {
    let timeout_ms = timeout.as_millis() as u64;
    let mut details = Details::new();
    details.insert("timeout_ms".to_string(), json!(timeout_ms));
    StructuredError::with_details(
        ErrorKind::TaskFailed,
        format!("Task timed out after {timeout_ms}ms"),
        details,
    )
}

fn from_join_error(err: JoinError) -> StructuredError {
    if err.is_panic() {
        let message = panic_message(err.into_panic());
        StructuredError::internal(format!("Task panicked: {message}"))
    } else {
        StructuredError::internal("Task was cancelled")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
