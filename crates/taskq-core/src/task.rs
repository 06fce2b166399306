//! Catalog of submittable units of work.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Task name of [`TaskRequest::Add`].
pub const ADD_TASK: &str = "add";

/// Task name of [`TaskRequest::ProcessFile`].
pub const PROCESS_FILE_TASK: &str = "process_file";

/// Arguments of the `add` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddArgs {
    pub a: i64,
    pub b: i64,
}

/// Arguments of the `process_file` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFileArgs {
    pub file_path: String,
}

/// A typed task submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskRequest {
    Add(AddArgs),
    ProcessFile(ProcessFileArgs),
}

impl TaskRequest {
    pub fn add(a: i64, b: i64) -> Self {
        Self::Add(AddArgs { a, b })
    }

    pub fn process_file(file_path: impl Into<String>) -> Self {
        Self::ProcessFile(ProcessFileArgs {
            file_path: file_path.into(),
        })
    }

    /// Registered name of the unit of work.
    pub fn task_name(&self) -> &'static str {
        match self {
            Self::Add(_) => ADD_TASK,
            Self::ProcessFile(_) => PROCESS_FILE_TASK,
        }
    }

    /// Arguments as the JSON object handed to the broker.
    pub fn args(&self) -> Value {
        let args = match self {
            Self::Add(args) => serde_json::to_value(args),
            Self::ProcessFile(args) => serde_json::to_value(args),
        };
        // Plain structs of integers and strings always serialize.
        args.unwrap_or(Value::Null)
    }
}
