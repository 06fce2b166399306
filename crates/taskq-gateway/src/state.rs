//! Shared application state.

use std::sync::Arc;

use crate::gateway::TaskGateway;

/// Shared application state handed to every HTTP handler.
pub struct AppState {
    /// Submission and status interface.
    pub gateway: TaskGateway,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(gateway: TaskGateway) -> Arc<Self> {
        Arc::new(Self { gateway })
    }
}
