//! Periodic purge of expired task results.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use taskq_broker::Broker;

/// Purge expired results every `interval` until `shutdown` fires.
pub async fn run_result_reaper(
    broker: Arc<dyn Broker>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut timer = tokio::time::interval(interval);
    // The first tick completes immediately.
    timer.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = timer.tick() => {
                let purged = broker.purge_expired().await;
                debug!(purged, "Result reaper pass");
            }
        }
    }
}
