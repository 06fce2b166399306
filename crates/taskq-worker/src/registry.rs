//! Task registry.
//!
//! Maps task names to handlers. Built once at startup and shared by `Arc`
//! between the gateway (to reject unknown task names) and the worker pool.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use taskq_core::{Details, StructuredError, ADD_TASK, PROCESS_FILE_TASK};

use crate::tasks::{AddTask, ProcessFileTask};

/// Error type units of work may return.
///
/// A [`StructuredError`] inside the box is reported as-is; anything else is
/// reported as `INTERNAL_ERROR`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of running a unit of work.
pub type HandlerResult = Result<Value, BoxError>;

/// A named unit of work.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Run the task with its raw JSON arguments.
    async fn run(&self, args: Value) -> HandlerResult;
}

/// Name → handler table.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `add` and `process_file` tasks.
    pub fn builtin(task_delay: Duration) -> Self {
        let mut registry = Self::new();
        registry
            .register(ADD_TASK, AddTask::new(task_delay))
            .register(PROCESS_FILE_TASK, ProcessFileTask::new(task_delay));
        registry
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl TaskHandler + 'static,
    ) -> &mut Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered task names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Decode a task's JSON arguments, reporting failures as `INVALID_INPUT`.
pub fn parse_args<T: DeserializeOwned>(task_name: &str, args: Value) -> Result<T, StructuredError> {
    serde_json::from_value(args).map_err(|e| {
        let mut details = Details::new();
        details.insert("task_name".to_string(), Value::String(task_name.to_string()));
        StructuredError::invalid_input(
            format!("Invalid arguments for {task_name}: {e}"),
            Some(details),
        )
    })
}
