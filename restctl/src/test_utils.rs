//! Test utilities: throwaway databases, fixtures and an in-process server.

use crate::{
    AppState,
    auth::{
        api_keys::generate_token,
        current_user::Principal,
        password::{Argon2Params, hash_password},
        roles::Role,
        session::create_session_token,
    },
    config::{Config, DatabaseConfig, PoolSettings},
    db::{
        handlers::{ApiKeys, Repository, UserGroups, Users},
        models::{
            api_keys::{ApiKeyCreateDBRequest, ApiKeyDBResponse},
            user_groups::{UserGroupCreateDBRequest, UserGroupDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
};
use axum_test::TestServer;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Password of every user created by [`create_test_user`].
pub const TEST_PASSWORD: &str = "password123";

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };

    // Cheapest parameters argon2 accepts
    config.auth.password.argon2_memory_kib = 8;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config.auth.lockout.max_failures = 3;
    config.request_logging.enabled = true;
    config
}

/// A migrated database in a fresh temp directory. Keep the directory alive for the test.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("test.db").display()),
        pool: PoolSettings {
            max_connections: 4,
            ..Default::default()
        },
    };

    let pool = crate::connect_pool(&config).await.expect("Failed to open test database");
    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    (pool, dir)
}

pub async fn create_test_state() -> (AppState, TempDir) {
    let (pool, dir) = create_test_pool().await;
    let state = AppState::builder().db(pool).config(create_test_config()).build();
    (state, dir)
}

/// The full router over a fresh database, without a root user.
pub async fn create_test_server() -> (TestServer, AppState, TempDir) {
    let (state, dir) = create_test_state().await;
    let router = crate::build_router(state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state, dir)
}

pub async fn create_test_group(pool: &SqlitePool, name: &str, role: Role) -> UserGroupDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    UserGroups::new(&mut conn)
        .create(&UserGroupCreateDBRequest {
            name: name.to_string(),
            role,
        })
        .await
        .expect("Failed to create test group")
}

/// Groups named `"{owner} {ROLE}"`, one per role.
async fn groups_for(pool: &SqlitePool, owner: &str, roles: &[Role]) -> Vec<UserGroupDBResponse> {
    let mut groups = Vec::with_capacity(roles.len());
    for role in roles {
        groups.push(create_test_group(pool, &format!("{owner} {}", role.as_str()), *role).await);
    }
    groups
}

/// A user with password [`TEST_PASSWORD`], email `{username}@example.com` and one group per role.
pub async fn create_test_user(pool: &SqlitePool, username: &str, roles: &[Role]) -> UserDBResponse {
    let groups = groups_for(pool, username, roles).await;
    let params = Argon2Params::from(&create_test_config().auth.password);

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{username}@example.com"),
            language: "en".to_string(),
            locale: "en".to_string(),
            timezone: "Europe/Helsinki".to_string(),
            password_hash: hash_password(TEST_PASSWORD, params).expect("Failed to hash password"),
            user_groups: groups.iter().map(|g| g.id).collect(),
        })
        .await
        .expect("Failed to create test user")
}

/// An API key with one group per role.
pub async fn create_test_api_key(pool: &SqlitePool, roles: &[Role]) -> ApiKeyDBResponse {
    let token = generate_token();
    let groups = groups_for(pool, &format!("key-{}", &token[..8]), roles).await;

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    ApiKeys::new(&mut conn)
        .create(&ApiKeyCreateDBRequest {
            token,
            description: "Test key".to_string(),
            user_groups: groups.iter().map(|g| g.id).collect(),
        })
        .await
        .expect("Failed to create test API key")
}

/// A freshly created root user as a principal.
pub async fn root_principal(pool: &SqlitePool) -> Principal {
    Principal::User(create_test_user(pool, "root", &[Role::Root]).await)
}

/// `Authorization` header value for a user.
pub fn bearer_token(user: &UserDBResponse, config: &Config) -> String {
    let token = create_session_token(user, config).expect("Failed to create session token");
    format!("Bearer {token}")
}

/// `Authorization` header value for an API key.
pub fn api_key_header(key: &ApiKeyDBResponse) -> String {
    format!("ApiKey {}", key.token)
}
