//! Middleware writing one `log_requests` row per handled request.

use axum::{
    body::{Body, HttpBody, to_bytes},
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method, StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::net::SocketAddr;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::{
    AppState,
    config::RequestLoggingConfig,
    db::{errors::DbError, handlers::LogRequests},
    db::models::logs::LogRequestCreateDBRequest,
    errors::Error,
    request_logging::{ClientInfo, PrincipalSlot, sanitize},
};

/// Largest request body the middleware buffers.
pub const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// Whether a request to `path` with `method` is written to the log.
pub fn should_log(config: &RequestLoggingConfig, method: &Method, path: &str) -> bool {
    config.enabled && method != Method::OPTIONS && !config.ignored_routes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

pub async fn log_requests(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, Error> {
    let config = &state.config.request_logging;
    if !should_log(config, request.method(), request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_BUFFERED_BODY).await.map_err(|e| Error::Http {
        status: StatusCode::PAYLOAD_TOO_LARGE,
        message: format!("Request body too large: {e}"),
    })?;

    let slot = PrincipalSlot::default();
    parts.extensions.insert(slot.clone());

    let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|info| info.0);
    let client = ClientInfo::from_parts(&parts.headers, peer);

    let time = Utc::now();
    let mut entry = LogRequestCreateDBRequest {
        user_id: None,
        api_key_id: None,
        client_ip: client.client_ip,
        method: parts.method.to_string(),
        scheme: scheme(&parts.headers, parts.uri.scheme_str()),
        http_host: client.http_host,
        path: parts.uri.path().to_string(),
        query_string: parts.uri.query().map(str::to_string),
        uri: parts.uri.to_string(),
        headers: sanitize::sanitize_headers(&parts.headers),
        parameters: sanitize::parameters(parts.uri.query(), &body),
        content: sanitize::sanitize_content(&body, config.max_content_length),
        status_code: 0,
        response_content_length: 0,
        is_xml_http_request: parts
            .headers
            .get("x-requested-with")
            .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"XMLHttpRequest")),
        agent: client.agent,
        time,
    };

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    let ids = slot.get();
    entry.user_id = ids.user_id;
    entry.api_key_id = ids.api_key_id;
    entry.status_code = response.status().as_u16();
    entry.response_content_length = response_content_length(&response);

    tokio::spawn(write_entry(state.db.clone(), entry));

    Ok(response)
}

fn scheme(headers: &HeaderMap, uri_scheme: Option<&str>) -> String {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .or(uri_scheme)
        .unwrap_or("http")
        .to_string()
}

fn response_content_length(response: &Response) -> i64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact().and_then(|n| i64::try_from(n).ok()))
        .unwrap_or(0)
}

/// Insert the row. A principal deleted by its own request no longer satisfies the foreign keys, so
/// the row is retried without it.
async fn write_entry(db: SqlitePool, mut entry: LogRequestCreateDBRequest) {
    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(error = %e, "Failed to acquire connection for request log");
            return;
        }
    };

    let mut result = LogRequests::new(&mut conn).create(&entry).await;
    if matches!(result, Err(DbError::ForeignKeyViolation { .. })) {
        debug!(path = %entry.path, "Principal is gone, logging request anonymously");
        entry.user_id = None;
        entry.api_key_id = None;
        result = LogRequests::new(&mut conn).create(&entry).await;
    }

    match result {
        Ok(_) => debug!(path = %entry.path, status = entry.status_code, "Request logged"),
        Err(e) => warn!(error = %e, path = %entry.path, "Failed to write request log"),
    }
}
