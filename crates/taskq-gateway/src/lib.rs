//! taskq Gateway Library
//!
//! This crate provides the task submission/status interface and its HTTP
//! surface. Task execution happens in a [`taskq_worker::WorkerPool`] that
//! shares only the broker with the gateway.

pub mod config;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod reaper;
pub mod state;

pub use config::Config;
pub use gateway::{GatewayError, TaskGateway, TaskStatusView};
pub use state::AppState;
