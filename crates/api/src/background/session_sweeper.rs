//! Periodic removal of abandoned authoring sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sessions::SessionRegistry;

/// How often idle sessions are looked for.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Drop sessions idle longer than `idle_timeout` until `cancel` is triggered.
pub async fn run(registry: Arc<SessionRegistry>, idle_timeout: Duration, cancel: CancellationToken) {
    tracing::info!(
        idle_timeout_secs = idle_timeout.as_secs(),
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Session sweeper started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                let dropped = registry.sweep_idle(idle_timeout).await;
                if dropped > 0 {
                    tracing::info!(dropped, "Dropped idle sessions");
                } else {
                    tracing::debug!("No idle sessions to drop");
                }
            }
        }
    }
}
