//! Stored task records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use taskq_core::{TaskId, TaskState};

/// Everything the store knows about one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique task identifier.
    pub id: TaskId,

    /// Registered name of the unit of work.
    pub task_name: String,

    /// Arguments as submitted.
    pub args: Value,

    /// Current lifecycle state.
    pub state: TaskState,

    /// Raw stored outcome; present once the task is terminal.
    pub outcome: Option<Value>,

    /// When the task was enqueued.
    pub created_at: DateTime<Utc>,

    /// When a worker picked the task up.
    pub started_at: Option<DateTime<Utc>>,

    /// When the outcome was committed.
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Create a pending record.
    pub fn new(id: TaskId, task_name: impl Into<String>, args: Value) -> Self {
        Self {
            id,
            task_name: task_name.into(),
            args,
            state: TaskState::Pending,
            outcome: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Whether the result has outlived `ttl` at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        match self.finished_at {
            Some(finished_at) => (now - finished_at)
                .to_std()
                .map(|age| age >= ttl)
                .unwrap_or(false),
            None => false,
        }
    }
}
