//! HTTP request and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use taskq_core::TaskId;

use crate::gateway::GatewayError;

// ============================================================================
// Submission types
// ============================================================================

/// Query parameters for `POST /tasks/add`.
#[derive(Debug, Deserialize)]
pub struct AddQuery {
    pub a: i64,
    pub b: i64,
}

/// Query parameters for `POST /tasks/process-file`.
#[derive(Debug, Deserialize)]
pub struct ProcessFileQuery {
    pub file_path: String,
}

/// Response body for task submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub task_id: TaskId,
    pub status: String,
}

impl SubmitResponse {
    pub fn submitted(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: "submitted".to_string(),
        }
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::UnknownTask(_) => StatusCode::BAD_REQUEST,
            GatewayError::Broker(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            error!(error = %self, "Gateway request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
