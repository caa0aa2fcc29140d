//! Database models for the audit log tables.

use crate::types::{ApiKeyId, LogId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A handled HTTP request, ready to be persisted
#[derive(Debug, Clone)]
pub struct LogRequestCreateDBRequest {
    pub user_id: Option<UserId>,
    pub api_key_id: Option<ApiKeyId>,
    pub client_ip: String,
    pub method: String,
    pub scheme: String,
    pub http_host: String,
    pub path: String,
    pub query_string: Option<String>,
    pub uri: String,
    pub headers: serde_json::Value,
    pub parameters: serde_json::Value,
    pub content: String,
    pub status_code: u16,
    pub response_content_length: i64,
    pub is_xml_http_request: bool,
    pub agent: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LogRequestDBResponse {
    pub id: LogId,
    pub user_id: Option<UserId>,
    pub api_key_id: Option<ApiKeyId>,
    pub client_ip: String,
    pub method: String,
    pub scheme: String,
    pub http_host: String,
    pub path: String,
    pub query_string: Option<String>,
    pub uri: String,
    pub headers: serde_json::Value,
    pub parameters: serde_json::Value,
    pub content: String,
    pub status_code: u16,
    pub response_content_length: i64,
    pub is_xml_http_request: bool,
    pub agent: String,
    pub time: DateTime<Utc>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginType {
    Success,
    Failure,
}

impl LoginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginType::Success => "success",
            LoginType::Failure => "failure",
        }
    }
}

impl fmt::Display for LoginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A login attempt, ready to be persisted
#[derive(Debug, Clone)]
pub struct LogLoginCreateDBRequest {
    pub login_type: LoginType,
    pub username: String,
    pub user_id: Option<UserId>,
    pub client_ip: String,
    pub http_host: String,
    pub agent: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LogLoginDBResponse {
    pub id: LogId,
    pub login_type: LoginType,
    pub username: String,
    pub user_id: Option<UserId>,
    pub client_ip: String,
    pub http_host: String,
    pub agent: String,
    pub time: DateTime<Utc>,
    pub date: NaiveDate,
}
