//! HTTP server for the gateway.
//!
//! Provides endpoints for:
//! - Task submission (`/tasks/add`, `/tasks/process-file`)
//! - Task status (`/tasks/:task_id`)
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        // Task routes
        .route("/tasks/add", post(handlers::submit_add))
        .route("/tasks/process-file", post(handlers::submit_process_file))
        .route("/tasks/:task_id", get(handlers::get_task_status))
        // Observability routes
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use taskq_broker::{Broker, InMemoryBroker};
    use taskq_worker::{TaskRegistry, WorkerConfig, WorkerPool};
    use tokio::net::TcpListener;

    use crate::gateway::TaskGateway;

    struct TestServer {
        broker: Arc<InMemoryBroker>,
        base: String,
        client: reqwest::Client,
        pool: WorkerPool,
    }

    impl TestServer {
        async fn start() -> Self {
            let broker = Arc::new(InMemoryBroker::default());
            let registry = Arc::new(TaskRegistry::builtin(Duration::ZERO));
            let gateway = TaskGateway::new(broker.clone(), registry.clone());
            let pool = WorkerPool::new(broker.clone(), registry, WorkerConfig::default());

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let router = create_router(AppState::new(gateway));
            tokio::spawn(async move {
                axum::serve(listener, router).await.unwrap();
            });

            Self {
                broker,
                base: format!("http://{addr}"),
                client: reqwest::Client::new(),
                pool,
            }
        }

        async fn submit(&self, path: &str, query: &[(&str, &str)]) -> String {
            let resp = self
                .client
                .post(format!("{}{}", self.base, path))
                .query(query)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body["status"], "submitted");
            body["task_id"].as_str().unwrap().to_string()
        }

        async fn status(&self, task_id: &str) -> Value {
            let resp = self
                .client
                .get(format!("{}/tasks/{}", self.base, task_id))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            resp.json().await.unwrap()
        }

        async fn run_one(&self) {
            self.pool.process_next().await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_add_flow() {
        let server = TestServer::start().await;
        let task_id = server.submit("/tasks/add", &[("a", "2"), ("b", "3")]).await;

        assert_eq!(
            server.status(&task_id).await,
            json!({"task_id": task_id, "state": "PENDING"})
        );

        server.run_one().await;
        assert_eq!(
            server.status(&task_id).await,
            json!({"task_id": task_id, "state": "SUCCEEDED", "result": 5})
        );
    }

    #[tokio::test]
    async fn test_process_file_failure_flow() {
        let server = TestServer::start().await;
        let task_id = server
            .submit("/tasks/process-file", &[("file_path", "/nonexistent")])
            .await;
        server.run_one().await;

        assert_eq!(
            server.status(&task_id).await,
            json!({
                "task_id": task_id,
                "state": "FAILED",
                "error": {
                    "kind": "PATH_NOT_FOUND",
                    "message": "Path does not exist: /nonexistent",
                    "details": {"path": "/nonexistent"}
                }
            })
        );
    }

    #[tokio::test]
    async fn test_process_file_success_flow() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "twelve bytes").unwrap();
        let path = file.to_string_lossy().to_string();

        let server = TestServer::start().await;
        let task_id = server
            .submit("/tasks/process-file", &[("file_path", path.as_str())])
            .await;
        server.run_one().await;

        let body = server.status(&task_id).await;
        assert_eq!(body["state"], "SUCCEEDED");
        assert_eq!(
            body["result"],
            json!({"path": path, "size": 12, "processed": true})
        );
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_unknown_task_id_is_not_an_http_error() {
        let server = TestServer::start().await;
        assert_eq!(
            server.status("does-not-exist").await,
            json!({"task_id": "does-not-exist", "state": "UNKNOWN"})
        );
    }

    #[tokio::test]
    async fn test_malformed_query_is_rejected() {
        let server = TestServer::start().await;
        let resp = server
            .client
            .post(format!("{}/tasks/add", server.base))
            .query(&[("a", "two"), ("b", "3")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_closed_broker_returns_service_unavailable() {
        let server = TestServer::start().await;
        server.broker.close().await;

        let resp = server
            .client
            .post(format!("{}/tasks/add", server.base))
            .query(&[("a", "1"), ("b", "2")])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("Broker error"));
    }

    #[tokio::test]
    async fn test_root_health_and_metrics() {
        let server = TestServer::start().await;

        let root: Value = server
            .client
            .get(format!("{}/", server.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(root["message"], "taskq task gateway");

        let health: Value = server
            .client
            .get(format!("{}/health", server.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health, json!({"status": "ok"}));

        server.submit("/tasks/add", &[("a", "1"), ("b", "1")]).await;
        let metrics = server
            .client
            .get(format!("{}/metrics", server.base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(metrics.contains("taskq_tasks{state=\"pending\"} 1"));
    }
}
