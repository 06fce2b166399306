//! Broker errors.

use thiserror::Error;

use taskq_core::{CoreError, TaskId};

/// Errors returned by a [`Broker`](crate::Broker).
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// A terminal outcome was already committed for this task.
    #[error("Task already completed: {0}")]
    AlreadyCompleted(TaskId),

    #[error("Invalid task state change for {task_id}: {source}")]
    InvalidTransition {
        task_id: TaskId,
        #[source]
        source: CoreError,
    },

    /// The queue no longer accepts work.
    #[error("Broker is closed")]
    Closed,
}
