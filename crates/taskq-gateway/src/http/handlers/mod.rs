//! HTTP request handlers.

mod health;
mod tasks;

pub use health::{health_check, metrics_handler, root};
pub use tasks::{get_task_status, submit_add, submit_process_file};
