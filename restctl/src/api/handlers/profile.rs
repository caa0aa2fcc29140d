//! The current user's own profile. Only available to users, API keys get 401.

use axum::{Json, Router, routing::get};

use crate::{
    AppState,
    api::models::{user_groups::UserGroupResponse, users::ProfileResponse},
    auth::{current_user::CurrentUser, roles::Role},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/profile", get(get_profile))
        .route("/v1/profile/roles", get(get_profile_roles))
        .route("/v1/profile/groups", get(get_profile_groups))
}

#[utoipa::path(
    get,
    path = "/v1/profile",
    tag = "profile",
    summary = "Current user",
    responses(
        (status = 200, description = "The authenticated user with effective roles", body = ProfileResponse),
        (status = 401, description = "Not authenticated as a user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(user.into())
}

#[utoipa::path(
    get,
    path = "/v1/profile/roles",
    tag = "profile",
    summary = "Current user's roles",
    responses(
        (status = 200, description = "Effective roles, expanded through the hierarchy", body = Vec<Role>),
        (status = 401, description = "Not authenticated as a user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_profile_roles(CurrentUser(user): CurrentUser) -> Json<Vec<Role>> {
    Json(user.roles())
}

#[utoipa::path(
    get,
    path = "/v1/profile/groups",
    tag = "profile",
    summary = "Current user's groups",
    responses(
        (status = 200, description = "Groups the user belongs to", body = Vec<UserGroupResponse>),
        (status = 401, description = "Not authenticated as a user"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_profile_groups(CurrentUser(user): CurrentUser) -> Json<Vec<UserGroupResponse>> {
    Json(user.user_groups.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use crate::auth::roles::Role;
    use crate::test_utils::{api_key_header, bearer_token, create_test_api_key, create_test_server, create_test_user};
    use axum::http::StatusCode;
    use serde_json::Value;

    #[test_log::test(tokio::test)]
    async fn test_profile() {
        let (server, state, _dir) = create_test_server().await;
        let user = create_test_user(&state.db, "john", &[Role::Admin]).await;
        let token = bearer_token(&user, &state.config);

        let response = server.get("/v1/profile").add_header("authorization", token.as_str()).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["username"], "john");
        assert_eq!(body["roles"], serde_json::json!(["ROLE_LOGGED", "ROLE_USER", "ROLE_ADMIN"]));
        assert!(body.get("passwordHash").is_none());

        let roles: Vec<Role> = server
            .get("/v1/profile/roles")
            .add_header("authorization", token.as_str())
            .await
            .json();
        assert_eq!(roles, vec![Role::Logged, Role::User, Role::Admin]);

        let groups: Vec<Value> = server
            .get("/v1/profile/groups")
            .add_header("authorization", token.as_str())
            .await
            .json();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["role"], "ROLE_ADMIN");
    }

    #[test_log::test(tokio::test)]
    async fn test_profile_rejects_anonymous_and_api_keys() {
        let (server, state, _dir) = create_test_server().await;
        let key = create_test_api_key(&state.db, &[Role::Root]).await;

        server.get("/v1/profile").await.assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/v1/profile")
            .add_header("authorization", api_key_header(&key).as_str())
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/v1/profile")
            .add_header("authorization", "Bearer not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
