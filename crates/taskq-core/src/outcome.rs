//! Task outcomes.

use serde_json::Value;

use crate::StructuredError;

/// The result of running one task: exactly one of a payload or an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Success(Value),
    Failure(StructuredError),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Borrow the error, if this is a failure.
    pub fn error(&self) -> Option<&StructuredError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(err) => Some(err),
        }
    }
}

impl From<Result<Value, StructuredError>> for TaskOutcome {
    fn from(result: Result<Value, StructuredError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failure(err),
        }
    }
}
