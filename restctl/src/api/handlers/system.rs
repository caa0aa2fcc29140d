//! Unversioned endpoints: index, health and version.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Map, Value};

use crate::{
    AppState,
    api::models::system::{HealthzResponse, VersionResponse},
    db::{errors::DbError, handlers::Healthz},
    errors::Result,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/version", get(version))
}

#[utoipa::path(get, path = "/", tag = "system", summary = "Index", responses((status = 200, description = "Empty object")))]
pub async fn index() -> Json<Value> {
    Json(Value::Object(Map::new()))
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "system",
    summary = "Health check",
    description = "Writes a row to prove the database accepts writes.",
    responses(
        (status = 200, description = "Healthy", body = HealthzResponse),
        (status = 500, description = "Database unavailable"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn healthz(State(state): State<AppState>) -> Result<Json<HealthzResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let timestamp = Healthz::new(&mut conn).create().await?;
    Ok(Json(HealthzResponse { timestamp }))
}

#[utoipa::path(get, path = "/version", tag = "system", summary = "Version", responses((status = 200, description = "Crate version", body = VersionResponse)))]
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::create_test_server;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn test_system_endpoints() {
        let (server, _state, _dir) = create_test_server().await;

        let index = server.get("/").await;
        index.assert_status_ok();
        assert_eq!(index.json::<Value>(), json!({}));

        let healthz = server.get("/healthz").await;
        healthz.assert_status_ok();
        assert!(healthz.json::<Value>()["timestamp"].is_string());

        let version = server.get("/version").await;
        assert_eq!(version.json::<Value>()["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(version.header("x-api-version"), env!("CARGO_PKG_VERSION"));
    }
}
