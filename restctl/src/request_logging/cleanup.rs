//! Periodic removal of expired audit rows.

use chrono::Utc;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{
    config::RequestLoggingConfig,
    db::{
        errors::{DbError, Result},
        handlers::{Healthz, LogLogins, LogRequests},
    },
};

/// Rows removed by one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub requests: u64,
    pub logins: u64,
    pub healthz: u64,
}

/// Delete `log_requests`, `log_logins` and `healthz` rows older than the retention period.
#[instrument(skip_all, err)]
pub async fn cleanup_once(db: &SqlitePool, retention: std::time::Duration) -> Result<CleanupStats> {
    let retention = chrono::Duration::from_std(retention).map_err(|e| DbError::Other(e.into()))?;
    let cutoff = Utc::now() - retention;

    let mut tx = crate::db::begin_write(db).await?;
    let stats = CleanupStats {
        requests: LogRequests::new(&mut tx).delete_older_than(cutoff).await?,
        logins: LogLogins::new(&mut tx).delete_older_than(cutoff).await?,
        healthz: Healthz::new(&mut tx).delete_older_than(cutoff).await?,
    };
    tx.commit().await?;

    Ok(stats)
}

/// Run [`cleanup_once`] every `cleanup_interval` until `shutdown` is cancelled.
pub async fn run_cleanup(db: SqlitePool, config: RequestLoggingConfig, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(config.cleanup_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Log cleanup task shutting down");
                return;
            }
            _ = interval.tick() => {
                match cleanup_once(&db, config.retention).await {
                    Ok(stats) if stats != CleanupStats::default() => info!(?stats, "Removed expired log rows"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Log cleanup failed"),
                }
            }
        }
    }
}
