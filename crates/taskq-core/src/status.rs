//! Task lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoreError;

/// State of a task as seen by the result store and the gateway.
///
/// `Pending -> Running -> {Succeeded, Failed}`. `Unknown` is reported for ids
/// the store has never seen or has already purged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Task enqueued but not yet picked up by a worker.
    #[default]
    Pending,
    /// A worker is executing the task.
    Running,
    /// Task completed and its outcome was stored.
    Succeeded,
    /// Task failed and its failure was stored.
    Failed,
    /// Id not recognized by the store (never issued, or expired).
    Unknown,
}

impl TaskState {
    /// Returns true if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Stable wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Validate a lifecycle transition performed by the store.
    pub fn transition(self, to: TaskState) -> Result<TaskState, CoreError> {
        let allowed = matches!(
            (self, to),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Succeeded)
                | (Self::Pending, Self::Failed)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
        );
        if allowed {
            Ok(to)
        } else {
            Err(CoreError::InvalidStateTransition {
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
