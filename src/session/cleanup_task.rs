use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, instrument};

use super::registry::{SessionHandle, SessionRegistry};
use crate::shared::ChatId;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the cleanup task
    pub cleanup_interval: Duration,
    /// How long a stopped session is kept before it is removed
    pub retention: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(5 * 60), // 5 minutes
            retention: Duration::from_secs(30 * 60),       // 30 minutes
        }
    }
}

/// Starts the background task that periodically removes stopped sessions
/// nobody closed explicitly
#[instrument(skip(registry))]
pub async fn start_cleanup_task(registry: Arc<SessionRegistry>, config: CleanupConfig) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        retention_secs = config.retention.as_secs(),
        "Starting session cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        let removed = sweep_stopped_sessions(&registry, config.retention).await;
        if removed > 0 {
            info!(removed = removed, "Session cleanup completed");
        }
    }
}

/// Removes sessions that have been STOPPED for at least `retention`
pub(crate) async fn sweep_stopped_sessions(
    registry: &SessionRegistry,
    retention: Duration,
) -> usize {
    let expired = find_expired(registry, retention).await;
    remove_expired(registry, expired).await
}

/// Handles of sessions stopped for at least `retention`
async fn find_expired(
    registry: &SessionRegistry,
    retention: Duration,
) -> Vec<(ChatId, SessionHandle)> {
    let now = Utc::now();
    let mut expired = Vec::new();

    for chat_id in registry.chat_ids().await {
        let Ok(handle) = registry.get(chat_id).await else {
            continue;
        };

        let stopped_at = handle.lock().await.stopped_at();
        if let Some(stopped_at) = stopped_at {
            let age = (now - stopped_at).to_std().unwrap_or_default();
            if age >= retention {
                expired.push((chat_id, handle));
            }
        }
    }

    expired
}

/// Removes each session unless its chat was closed or reopened since it was found
async fn remove_expired(
    registry: &SessionRegistry,
    expired: Vec<(ChatId, SessionHandle)>,
) -> usize {
    let mut removed = 0;
    for (chat_id, handle) in expired {
        if registry.close_if(chat_id, &handle).await {
            removed += 1;
            info!(chat_id = chat_id, "Removed stopped session");
        } else {
            debug!(chat_id = chat_id, "Stopped session already gone or replaced");
        }
    }

    removed
}
