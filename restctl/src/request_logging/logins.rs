//! Login audit log and account lockout.
//!
//! Every call to the token endpoint writes a `log_logins` row. Wrong passwords for known users
//! additionally write a `log_login_failures` row; once a user has `auth.lockout.max_failures`
//! of those the account is locked until a successful login clears them, which a locked account
//! cannot do. Unlocking is done by deleting the rows.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{instrument, warn};

use crate::{
    config::LockoutConfig,
    db::{
        errors::Result,
        handlers::{LogLoginFailures, LogLogins},
        models::logs::{LogLoginCreateDBRequest, LoginType},
    },
    request_logging::ClientInfo,
    types::UserId,
};

/// Write a `log_logins` row. Failures are logged and swallowed.
#[instrument(skip(conn, user_id, client))]
pub async fn record_attempt(
    conn: &mut SqliteConnection,
    login_type: LoginType,
    username: &str,
    user_id: Option<UserId>,
    client: &ClientInfo,
) {
    let request = LogLoginCreateDBRequest {
        login_type,
        username: username.to_string(),
        user_id,
        client_ip: client.client_ip.clone(),
        http_host: client.http_host.clone(),
        agent: client.agent.clone(),
        time: Utc::now(),
    };

    if let Err(e) = LogLogins::new(conn).create(&request).await {
        warn!(error = %e, "Failed to write login log");
    }
}

/// Whether the user has reached the configured number of failed logins.
pub async fn is_locked(conn: &mut SqliteConnection, user_id: UserId, lockout: &LockoutConfig) -> Result<bool> {
    if lockout.max_failures == 0 {
        return Ok(false);
    }
    let failures = LogLoginFailures::new(conn).count_for_user(user_id).await?;
    Ok(failures >= i64::from(lockout.max_failures))
}

pub async fn record_failure(conn: &mut SqliteConnection, user_id: UserId) -> Result<()> {
    LogLoginFailures::new(conn).create(user_id).await
}

pub async fn clear_failures(conn: &mut SqliteConnection, user_id: UserId) -> Result<()> {
    LogLoginFailures::new(conn).clear_for_user(user_id).await?;
    Ok(())
}
