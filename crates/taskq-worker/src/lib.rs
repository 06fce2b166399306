//! taskq worker.
//!
//! Executes queued tasks. The pieces, from the inside out:
//! - [`TaskHandler`] / [`TaskRegistry`]: named units of work
//! - [`TaskExecutor`]: the boundary that turns every result, error, panic or
//!   timeout into a [`taskq_core::TaskOutcome`]
//! - [`WorkerPool`]: pulls jobs from a [`taskq_broker::Broker`] and commits
//!   exactly one encoded outcome per task

pub mod config;
pub mod executor;
pub mod pool;
pub mod registry;
pub mod tasks;

pub use config::{ReportMode, WorkerConfig};
pub use executor::TaskExecutor;
pub use pool::WorkerPool;
pub use registry::{parse_args, BoxError, HandlerResult, TaskHandler, TaskRegistry};
