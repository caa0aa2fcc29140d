//! Token issuing.

use axum::{Json, Router, extract::State, routing::post};

use crate::{
    AppState,
    api::models::auth::{GetTokenRequest, TokenResponse},
    auth::{password::verify_password_blocking, session},
    db::{errors::DbError, handlers::Users, models::logs::LoginType},
    errors::{Error, Result},
    request_logging::{ClientInfo, logins},
    rest::mapper::ApiJson,
    types::abbrev_uuid,
};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid credentials.".to_string()),
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/get_token", post(get_token))
}

#[utoipa::path(
    post,
    path = "/v1/auth/get_token",
    tag = "auth",
    summary = "Get a JWT",
    description = "Exchange a username (or email address) and password for a JWT. Accounts with too many failed logins are locked.",
    request_body = GetTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Invalid credentials or locked account"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_token(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(request): ApiJson<GetTokenRequest>,
) -> Result<Json<TokenResponse>> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let Some(user) = Users::new(&mut conn).get_by_identifier(&request.username).await? else {
        tracing::debug!("Unknown user");
        logins::record_attempt(&mut conn, LoginType::Failure, &request.username, None, &client).await;
        return Err(invalid_credentials());
    };

    if logins::is_locked(&mut conn, user.id, &state.config.auth.lockout).await? {
        tracing::info!(user_id = %abbrev_uuid(&user.id), "Login attempt on locked account");
        logins::record_attempt(&mut conn, LoginType::Failure, &request.username, Some(user.id), &client).await;
        return Err(Error::Unauthenticated {
            message: Some("Locked account.".to_string()),
        });
    }

    if !verify_password_blocking(request.password, user.password_hash.clone()).await? {
        logins::record_failure(&mut conn, user.id).await?;
        logins::record_attempt(&mut conn, LoginType::Failure, &request.username, Some(user.id), &client).await;
        return Err(invalid_credentials());
    }

    logins::clear_failures(&mut conn, user.id).await?;
    logins::record_attempt(&mut conn, LoginType::Success, &request.username, Some(user.id), &client).await;

    let token = session::create_session_token(&user, &state.config)?;
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use crate::auth::roles::Role;
    use crate::db::handlers::LogLogins;
    use crate::db::models::logs::LoginType;
    use crate::test_utils::{TEST_PASSWORD, create_test_server, create_test_user};
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_get_token_by_username_and_email() {
        let (server, state, _dir) = create_test_server().await;
        create_test_user(&state.db, "john", &[Role::User]).await;

        let response = server
            .post("/v1/auth/get_token")
            .json(&json!({"username": "john", "password": TEST_PASSWORD}))
            .await;
        response.assert_status_ok();
        let token = response.json::<serde_json::Value>()["token"].as_str().unwrap().to_string();

        server
            .get("/v1/profile")
            .add_header("authorization", format!("Bearer {token}"))
            .await
            .assert_status_ok();

        server
            .post("/v1/auth/get_token")
            .json(&json!({"username": "john@example.com", "password": TEST_PASSWORD}))
            .await
            .assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_credentials() {
        let (server, state, _dir) = create_test_server().await;
        create_test_user(&state.db, "john", &[Role::User]).await;

        for body in [
            json!({"username": "john", "password": "wrong-password"}),
            json!({"username": "nobody", "password": TEST_PASSWORD}),
        ] {
            let response = server.post("/v1/auth/get_token").json(&body).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(response.json::<serde_json::Value>()["message"], "Invalid credentials.");
        }

        let mut conn = state.db.acquire().await.unwrap();
        let logins = LogLogins::new(&mut conn).list_recent(10).await.unwrap();
        assert_eq!(logins.len(), 2);
        assert!(logins.iter().all(|l| l.login_type == LoginType::Failure));
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_body_is_json_400() {
        let (server, _state, _dir) = create_test_server().await;

        let response = server.post("/v1/auth/get_token").json(&json!({"username": "john"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], 400);
        assert!(body["message"].as_str().unwrap().contains("password"));

        let response = server
            .post("/v1/auth/get_token")
            .bytes("{not json".into())
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["status"], 400);
    }

    #[test_log::test(tokio::test)]
    async fn test_lockout_after_repeated_failures() {
        let (server, state, _dir) = create_test_server().await;
        create_test_user(&state.db, "john", &[Role::User]).await;
        let max_failures = state.config.auth.lockout.max_failures;

        for _ in 0..max_failures {
            server
                .post("/v1/auth/get_token")
                .json(&json!({"username": "john", "password": "wrong-password"}))
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }

        // The right password no longer helps
        let response = server
            .post("/v1/auth/get_token")
            .json(&json!({"username": "john", "password": TEST_PASSWORD}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["message"], "Locked account.");
    }

    #[test_log::test(tokio::test)]
    async fn test_success_resets_failures() {
        let (server, state, _dir) = create_test_server().await;
        create_test_user(&state.db, "john", &[Role::User]).await;
        let max_failures = state.config.auth.lockout.max_failures;

        for _ in 0..max_failures - 1 {
            server
                .post("/v1/auth/get_token")
                .json(&json!({"username": "john", "password": "wrong-password"}))
                .await;
        }
        server
            .post("/v1/auth/get_token")
            .json(&json!({"username": "john", "password": TEST_PASSWORD}))
            .await
            .assert_status_ok();
        server
            .post("/v1/auth/get_token")
            .json(&json!({"username": "john", "password": "wrong-password"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/v1/auth/get_token")
            .json(&json!({"username": "john", "password": TEST_PASSWORD}))
            .await
            .assert_status_ok();
    }
}
