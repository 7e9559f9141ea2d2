//! Periodic eviction of expired sessions

use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::services::session::SessionManager;

/// Spawn the background sweep task.
///
/// The request path already treats expired sessions as absent; this task
/// reclaims their memory so abandoned sessions do not pile up. Cancel the
/// token to stop it; a sweep in progress finishes first.
pub fn start_cleanup_task(
    sessions: Arc<SessionManager>,
    interval_secs: u64,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(cleanup_loop(sessions, interval_secs, cancel_token))
}

async fn cleanup_loop(
    sessions: Arc<SessionManager>,
    interval_secs: u64,
    cancel_token: CancellationToken,
) {
    let mut interval = time::interval(Duration::from_secs(interval_secs));

    info!("Session cleanup task started ({}s interval)", interval_secs);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Session cleanup task stopped");
                break;
            }
            _ = interval.tick() => {
                let removed = sessions.cleanup_expired().await;
                if removed > 0 {
                    info!("Removed {} expired session(s)", removed);
                } else {
                    debug!("No expired sessions to remove");
                }
            }
        }
    }
}
