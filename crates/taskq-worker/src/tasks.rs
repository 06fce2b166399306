//! Built-in units of work.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use taskq_core::{
    AddArgs, Details, ProcessFileArgs, StructuredError, ADD_TASK, PROCESS_FILE_TASK,
};

use crate::registry::{parse_args, BoxError, HandlerResult, TaskHandler};

/// `add(a, b) -> a + b`
pub struct AddTask {
    delay: Duration,
}

impl AddTask {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TaskHandler for AddTask {
    async fn run(&self, args: Value) -> HandlerResult {
        let AddArgs { a, b } = parse_args(ADD_TASK, args)?;
        simulate_latency(self.delay).await;

        let sum = a.checked_add(b).ok_or_else(|| {
            let mut details = Details::new();
            details.insert("a".to_string(), json!(a));
            details.insert("b".to_string(), json!(b));
            StructuredError::invalid_input(
                format!("Integer overflow adding {a} and {b}"),
                Some(details),
            )
        })?;
        Ok(json!(sum))
    }
}

/// `process_file(file_path) -> {path, size, processed}`
pub struct ProcessFileTask {
    delay: Duration,
}

impl ProcessFileTask {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl TaskHandler for ProcessFileTask {
    async fn run(&self, args: Value) -> HandlerResult {
        let ProcessFileArgs { file_path } = parse_args(PROCESS_FILE_TASK, args)?;
        simulate_latency(self.delay).await;

        let metadata = tokio::fs::metadata(&file_path)
            .await
            .map_err(|e| classify_io(e, &file_path, StructuredError::path_not_found))?;

        if !metadata.is_file() {
            let mut details = Details::new();
            details.insert("path".to_string(), json!(file_path));
            return Err(StructuredError::invalid_input(
                format!("Path is not a file: {file_path}"),
                Some(details),
            )
            .into());
        }

        // The file can vanish between the stat above and the open below.
        let file = tokio::fs::File::open(&file_path)
            .await
            .map_err(|e| classify_io(e, &file_path, StructuredError::file_not_found))?;
        let size = file.metadata().await?.len();

        debug!(path = %file_path, size, "Processed file");
        Ok(json!({
            "path": file_path,
            "size": size,
            "processed": true,
        }))
    }
}

/// Map filesystem errors onto the error taxonomy.
///
/// Unclassified errors stay plain and become `INTERNAL_ERROR` at the executor.
fn classify_io(err: io::Error, path: &str, not_found: fn(&str) -> StructuredError) -> BoxError {
    match err.kind() {
        io::ErrorKind::NotFound => not_found(path).into(),
        io::ErrorKind::PermissionDenied => StructuredError::permission_denied(path).into(),
        _ => err.into(),
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
