//! Task submission and status handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use taskq_core::{TaskId, TaskRequest};

use crate::gateway::{GatewayError, TaskStatusView};
use crate::http::responses::{AddQuery, ProcessFileQuery, SubmitResponse};
use crate::state::AppState;

/// Submit an addition task.
///
/// POST /tasks/add?a=<int>&b=<int>
pub async fn submit_add(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AddQuery>,
) -> Result<Json<SubmitResponse>, GatewayError> {
    let request = TaskRequest::add(query.a, query.b);
    let task_id = state.gateway.submit(&request).await?;
    Ok(Json(SubmitResponse::submitted(task_id)))
}

/// Submit a file processing task.
///
/// POST /tasks/process-file?file_path=<string>
pub async fn submit_process_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProcessFileQuery>,
) -> Result<Json<SubmitResponse>, GatewayError> {
    let request = TaskRequest::process_file(query.file_path);
    let task_id = state.gateway.submit(&request).await?;
    Ok(Json(SubmitResponse::submitted(task_id)))
}

/// Get the state of a task, with its result or error once finished.
///
/// GET /tasks/:task_id
pub async fn get_task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusView>, GatewayError> {
    let view = state.gateway.status(&TaskId::new(task_id)).await?;
    Ok(Json(view))
}
