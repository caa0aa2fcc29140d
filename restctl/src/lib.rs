//! # restctl: REST backend for users, groups, roles and API keys
//!
//! `restctl` serves a JSON REST API over a SQLite database. It manages user accounts, the user
//! groups that grant them roles, and API keys for machine clients, and it keeps an audit trail
//! of every request and login attempt.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum), persistence is SQLx over SQLite.
//!
//! ### Request Flow
//!
//! Every request passes the request logging middleware ([`request_logging`]), which buffers the
//! body and writes a `log_requests` row once the response is known. Handlers authenticate lazily:
//! the [`auth::current_user::Principal`] extractor accepts a JWT (`Authorization: Bearer ...`,
//! issued by `POST /v1/auth/get_token`) or an API key (`Authorization: ApiKey ...`), and
//! [`auth::permissions::RequiresRole`] checks the principal's roles against the role hierarchy.
//!
//! ### Core Components
//!
//! - [`rest`]: the generic resource layer. A [`rest::resource::RestResource`] binds a repository,
//!   a request DTO and a response shape; [`rest::actions`] turns it into axum handlers for
//!   find, count, ids, find one, create, update (PUT), patch and delete.
//! - [`resources`]: the four resources (roles, user groups, users, API keys).
//! - [`api`]: per-controller routers and the request/response models.
//! - [`db`]: repositories over SQLite and their records.
//! - [`auth`]: JWT sessions, API keys, password hashing, roles.
//!
//! ## Getting Started
//!
//! ```bash
//! RESTCTL_SECRET_KEY=change-me RESTCTL_ADMIN_PASSWORD=change-me-too cargo run
//! ```
//!
//! The API is documented at `/docs`, the OpenAPI document is served from `/docs/openapi.json`.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod request_logging;
pub mod resources;
pub mod rest;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::handlers,
    auth::{password, roles::Role},
    config::{CorsOrigin, DatabaseConfig},
    db::{
        errors::DbError,
        handlers::{Repository, UserGroups, Users},
        models::{
            user_groups::UserGroupCreateDBRequest,
            users::{UserCreateDBRequest, UserUpdateDBRequest},
        },
    },
    errors::Error,
    openapi::ApiDoc,
    resources::users::{DEFAULT_LANGUAGE, DEFAULT_LOCALE, DEFAULT_TIMEZONE},
};
use axum::{
    Json, Router,
    http::{self, HeaderName, HeaderValue, Method, Uri},
    middleware::from_fn_with_state,
    routing::get,
};
use bon::Builder;
pub use config::Config;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::{net::SocketAddr, str::FromStr, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ApiKeyId, UserGroupId, UserId};

/// Name of the group the initial root user is placed in.
pub const ROOT_GROUP_NAME: &str = "Root users";

const API_VERSION_HEADER: &str = "x-api-version";

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the restctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the SQLite pool. The database file is created if missing, foreign keys are enforced on
/// every connection.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = &config.pool;
    SqlitePoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
        .idle_timeout((pool.idle_timeout_secs > 0).then(|| Duration::from_secs(pool.idle_timeout_secs)))
        .connect_with(options)
        .await
}

/// Create the initial root user if it doesn't exist.
///
/// Idempotent: the user is placed in the [`ROOT_GROUP_NAME`] group (created with `ROLE_ROOT` on
/// first run), and an existing user has its password reset to the configured one. Nothing happens
/// when `admin_password` is unset.
///
/// Returns the id of the root user, if one was created or updated.
#[instrument(skip_all, fields(username = %config.admin_username))]
pub async fn create_initial_root_user(config: &Config, db: &SqlitePool) -> errors::Result<Option<UserId>> {
    let Some(password) = config.admin_password.clone() else {
        debug!("No admin password configured, skipping root user creation");
        return Ok(None);
    };
    let password_hash = password::hash_password_blocking(password, (&config.auth.password).into()).await?;

    let mut tx = crate::db::begin_write(db).await.map_err(DbError::from)?;

    let group = match UserGroups::new(&mut tx).get_by_name(ROOT_GROUP_NAME).await? {
        Some(group) => group,
        None => {
            UserGroups::new(&mut tx)
                .create(&UserGroupCreateDBRequest {
                    name: ROOT_GROUP_NAME.to_string(),
                    role: Role::Root,
                })
                .await?
        }
    };

    let mut users = Users::new(&mut tx);
    let user_id = match users.get_by_identifier(&config.admin_username).await? {
        Some(existing) => {
            users
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        password_hash: Some(password_hash),
                        ..Default::default()
                    },
                )
                .await?;
            users.add_to_group(existing.id, group.id).await?;
            existing.id
        }
        None => {
            let created = users
                .create(&UserCreateDBRequest {
                    username: config.admin_username.clone(),
                    first_name: "Root".to_string(),
                    last_name: "User".to_string(),
                    email: config.admin_email.clone(),
                    language: DEFAULT_LANGUAGE.to_string(),
                    locale: DEFAULT_LOCALE.to_string(),
                    timezone: DEFAULT_TIMEZONE.to_string(),
                    password_hash,
                    user_groups: vec![group.id],
                })
                .await?;
            info!("Created root user");
            created.id
        }
    };

    tx.commit().await.map_err(DbError::from)?;
    Ok(Some(user_id))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // tower-http refuses a literal `*` inside an origin list
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut exposed = vec![http::header::LOCATION];
    for name in &cors_config.exposed_headers {
        exposed.push(name.parse::<HeaderName>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(exposed);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

async fn route_not_found(method: Method, uri: Uri) -> Error {
    Error::Http {
        status: http::StatusCode::NOT_FOUND,
        message: format!("No route found for \"{method} {}\"", uri.path()),
    }
}

async fn method_not_allowed(method: Method) -> Error {
    Error::MethodNotAllowed {
        method: method.to_string(),
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router: every controller, the API docs, request logging, CORS, the
/// API version header and tracing.
///
/// Unknown routes answer 404 and known routes called with the wrong method answer 405, both
/// with the usual JSON error body.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api = Router::new()
        .merge(handlers::system::routes())
        .merge(handlers::auth::routes())
        .merge(handlers::profile::routes())
        .merge(handlers::localization::routes())
        .merge(handlers::roles::routes())
        .merge(handlers::user_groups::routes())
        .merge(handlers::users::routes())
        .merge(handlers::api_keys::routes())
        .route("/docs/openapi.json", get(openapi_json))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found);

    let router = api
        .layer(from_fn_with_state(state.clone(), request_logging::middleware::log_requests))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let router = router
        .layer(create_cors_layer(&state.config)?)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Background tasks running alongside the HTTP server.
///
/// Dropping the struct cancels the shutdown token through `drop_guard`.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
    // Pub so that we can disarm it if we want to
    pub drop_guard: Option<tokio_util::sync::DropGuard>,
}

impl BackgroundServices {
    fn start(pool: SqlitePool, config: &Config) -> Self {
        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let mut background_tasks = Vec::new();

        if config.request_logging.enabled {
            info!(
                retention = ?config.request_logging.retention,
                interval = ?config.request_logging.cleanup_interval,
                "Starting log cleanup task"
            );
            background_tasks.push(tokio::spawn(request_logging::cleanup::run_cleanup(
                pool,
                config.request_logging.clone(),
                shutdown_token.clone(),
            )));
        }

        Self {
            background_tasks,
            drop_guard: Some(shutdown_token.clone().drop_guard()),
            shutdown_token,
        }
    }

    /// Gracefully shutdown all background tasks
    pub async fn shutdown(mut self) {
        self.shutdown_token.cancel();
        if let Some(guard) = self.drop_guard.take() {
            guard.disarm();
        }

        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

/// The whole service: pool, state, router and background tasks.
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations, bootstraps the root
///    user and starts background services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until the
///    shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting restctl with configuration: {:#?}", config);

        let pool = connect_pool(&config.database).await?;
        migrator().run(&pool).await?;

        if let Some(user_id) = create_initial_root_user(&config, &pool).await? {
            info!(user_id = %types::abbrev_uuid(&user_id), "Root user ready");
        }

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;
        let bg_services = BackgroundServices::start(pool.clone(), &config);

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("restctl listening on http://{}, docs at http://localhost:{}/docs", bind_addr, self.config.port);

        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await?;

        self.bg_services.shutdown().await;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
