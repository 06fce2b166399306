//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::Arc;

use taskq_core::TaskState;

use crate::state::AppState;

const REPORTED_STATES: [TaskState; 4] = [
    TaskState::Pending,
    TaskState::Running,
    TaskState::Succeeded,
    TaskState::Failed,
];

/// Collect all metrics from AppState and format as Prometheus text.
pub async fn collect_metrics(state: &Arc<AppState>) -> String {
    let mut output = String::new();

    collect_task_metrics(state, &mut output).await;
    collect_registry_metrics(state, &mut output);

    output
}

/// Collect task metrics by state.
async fn collect_task_metrics(state: &Arc<AppState>, output: &mut String) {
    let counts = state.gateway.counts().await;

    writeln!(
        output,
        "# HELP taskq_tasks Number of live tasks in the result store by state"
    )
    .ok();
    writeln!(output, "# TYPE taskq_tasks gauge").ok();
    for task_state in REPORTED_STATES {
        let count = counts.get(&task_state).copied().unwrap_or(0);
        let label = task_state.as_str().to_lowercase();
        writeln!(output, "taskq_tasks{{state=\"{label}\"}} {count}").ok();
    }
}

fn collect_registry_metrics(state: &Arc<AppState>, output: &mut String) {
    let registered = state.gateway.registry().names().len();

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP taskq_registered_tasks Number of task names accepted for submission"
    )
    .ok();
    writeln!(output, "# TYPE taskq_registered_tasks gauge").ok();
    writeln!(output, "taskq_registered_tasks {registered}").ok();
}
