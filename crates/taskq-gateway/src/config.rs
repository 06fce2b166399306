//! Gateway configuration.

use std::time::Duration;

use taskq_broker::BrokerConfig;
use taskq_worker::WorkerConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub http_addr: String,

    /// How often expired results are purged.
    pub purge_interval: Duration,

    /// Result store settings.
    pub broker: BrokerConfig,

    /// Worker pool settings.
    pub worker: WorkerConfig,
}
