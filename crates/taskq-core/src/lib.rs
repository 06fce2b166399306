//! taskq Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Brokers or storage
//! - Runtime specifics
//!
//! The most important piece is the outcome protocol: how a task failure is
//! represented ([`StructuredError`]), carried ([`TaskOutcome`]) and encoded for
//! a result store ([`envelope`]) without losing its identity.

pub mod envelope;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod status;
pub mod task;
pub mod task_error;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::TaskId;
pub use outcome::TaskOutcome;
pub use status::TaskState;
pub use task::{AddArgs, ProcessFileArgs, TaskRequest, ADD_TASK, PROCESS_FILE_TASK};
pub use task_error::{Details, ErrorKind, StructuredError};
