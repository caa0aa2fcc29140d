//! Audit log tables: handled requests, login attempts and failed password attempts.
//!
//! These tables are append-only, so they expose inserts, recent-first listings and retention
//! cleanup instead of the full [`Repository`](super::Repository) surface.

use crate::types::{LogId, UserId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::logs::{LogLoginCreateDBRequest, LogLoginDBResponse, LogRequestCreateDBRequest, LogRequestDBResponse, LoginType},
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection, types::Json};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct LogRequest {
    pub id: LogId,
    pub user_id: Option<UserId>,
    pub api_key_id: Option<Uuid>,
    pub client_ip: String,
    pub method: String,
    pub scheme: String,
    pub http_host: String,
    pub path: String,
    pub query_string: Option<String>,
    pub uri: String,
    pub headers: Json<serde_json::Value>,
    pub parameters: Json<serde_json::Value>,
    pub content: String,
    pub status_code: i64,
    pub response_content_length: i64,
    pub is_xml_http_request: bool,
    pub agent: String,
    pub time: DateTime<Utc>,
    pub date: NaiveDate,
}

impl From<LogRequest> for LogRequestDBResponse {
    fn from(row: LogRequest) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            api_key_id: row.api_key_id,
            client_ip: row.client_ip,
            method: row.method,
            scheme: row.scheme,
            http_host: row.http_host,
            path: row.path,
            query_string: row.query_string,
            uri: row.uri,
            headers: row.headers.0,
            parameters: row.parameters.0,
            content: row.content,
            status_code: u16::try_from(row.status_code).unwrap_or_default(),
            response_content_length: row.response_content_length,
            is_xml_http_request: row.is_xml_http_request,
            agent: row.agent,
            time: row.time,
            date: row.date,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct LogLogin {
    pub id: LogId,
    pub user_id: Option<UserId>,
    #[sqlx(rename = "type")]
    pub login_type: String,
    pub username: String,
    pub client_ip: String,
    pub http_host: String,
    pub agent: String,
    pub time: DateTime<Utc>,
    pub date: NaiveDate,
}

impl From<LogLogin> for LogLoginDBResponse {
    fn from(row: LogLogin) -> Self {
        Self {
            id: row.id,
            login_type: if row.login_type == LoginType::Success.as_str() {
                LoginType::Success
            } else {
                LoginType::Failure
            },
            username: row.username,
            user_id: row.user_id,
            client_ip: row.client_ip,
            http_host: row.http_host,
            agent: row.agent,
            time: row.time,
            date: row.date,
        }
    }
}

pub struct LogRequests<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> LogRequests<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path), err)]
    pub async fn create(&mut self, request: &LogRequestCreateDBRequest) -> Result<LogRequestDBResponse> {
        let row = sqlx::query_as::<_, LogRequest>(
            r#"
            INSERT INTO log_requests (
                id, user_id, api_key_id, client_ip, method, scheme, http_host, path, query_string, uri,
                headers, parameters, content, status_code, response_content_length, is_xml_http_request,
                agent, time, date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.api_key_id)
        .bind(&request.client_ip)
        .bind(&request.method)
        .bind(&request.scheme)
        .bind(&request.http_host)
        .bind(&request.path)
        .bind(&request.query_string)
        .bind(&request.uri)
        .bind(Json(&request.headers))
        .bind(Json(&request.parameters))
        .bind(&request.content)
        .bind(i64::from(request.status_code))
        .bind(request.response_content_length)
        .bind(request.is_xml_http_request)
        .bind(&request.agent)
        .bind(request.time)
        .bind(request.time.date_naive())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row.into())
    }

    /// Most recent requests first.
    #[instrument(skip(self), err)]
    pub async fn list_recent(&mut self, limit: i64) -> Result<Vec<LogRequestDBResponse>> {
        let rows = sqlx::query_as::<_, LogRequest>("SELECT * FROM log_requests ORDER BY time DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    pub async fn delete_older_than(&mut self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM log_requests WHERE time < ?")
            .bind(cutoff)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

pub struct LogLogins<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> LogLogins<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(login_type = %request.login_type, username = %request.username), err)]
    pub async fn create(&mut self, request: &LogLoginCreateDBRequest) -> Result<LogLoginDBResponse> {
        let row = sqlx::query_as::<_, LogLogin>(
            r#"
            INSERT INTO log_logins (id, user_id, type, username, client_ip, http_host, agent, time, date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.login_type.as_str())
        .bind(&request.username)
        .bind(&request.client_ip)
        .bind(&request.http_host)
        .bind(&request.agent)
        .bind(request.time)
        .bind(request.time.date_naive())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row.into())
    }

    /// Most recent login attempts first.
    #[instrument(skip(self), err)]
    pub async fn list_recent(&mut self, limit: i64) -> Result<Vec<LogLoginDBResponse>> {
        let rows = sqlx::query_as::<_, LogLogin>("SELECT * FROM log_logins ORDER BY time DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    pub async fn delete_older_than(&mut self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM log_logins WHERE time < ?")
            .bind(cutoff)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

pub struct LogLoginFailures<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> LogLoginFailures<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn create(&mut self, user_id: UserId) -> Result<()> {
        sqlx::query("INSERT INTO log_login_failures (id, user_id, timestamp) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn count_for_user(&mut self, user_id: UserId) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM log_login_failures WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn clear_for_user(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM log_login_failures WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
