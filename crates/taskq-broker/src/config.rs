//! Broker configuration.

use std::time::Duration;

/// Broker configuration.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// How long a finished task result stays readable.
    pub result_ttl: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            result_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}
