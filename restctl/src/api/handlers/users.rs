//! User controller: the generic CRUD actions plus group membership.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    AppState,
    api::models::user_groups::UserGroupResponse,
    auth::{
        current_user::Principal,
        permissions::{RequiresRole, require_root_or_self},
        roles::{Role, role},
    },
    db::{self, errors::DbError, handlers::Users, models::user_groups::UserGroupDBResponse},
    errors::Result,
    resources::{UserGroupResource, UserResource},
    rest::{actions, resource::RestResource},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/user",
            get(actions::find::<UserResource, role::Admin>).post(actions::create::<UserResource, role::Root>),
        )
        .route("/v1/user/count", get(actions::count::<UserResource, role::Admin>))
        .route("/v1/user/ids", get(actions::ids::<UserResource, role::Admin>))
        .route(
            "/v1/user/{id}",
            get(actions::find_one::<UserResource, role::Admin>)
                .put(actions::update::<UserResource, role::Root>)
                .patch(actions::patch::<UserResource, role::Root>)
                .delete(actions::delete::<UserResource, role::Root>),
        )
        .route("/v1/user/{id}/groups", get(get_user_groups))
        .route("/v1/user/{id}/roles", get(get_user_roles))
        .route(
            "/v1/user/{id}/group/{group_id}",
            post(attach_user_group).delete(detach_user_group),
        )
}

fn group_responses(groups: Vec<UserGroupDBResponse>) -> Json<Vec<UserGroupResponse>> {
    Json(groups.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/v1/user/{id}/groups",
    tag = "user",
    summary = "User's groups",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Groups of the user", body = Vec<UserGroupResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required unless asking about yourself"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_groups(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserGroupResponse>>> {
    let id = UserResource::parse_id(&id)?;
    require_root_or_self(&principal, id)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = UserResource::find_one_or_fail(&mut conn, id).await?;

    Ok(group_responses(user.user_groups))
}

#[utoipa::path(
    get,
    path = "/v1/user/{id}/roles",
    tag = "user",
    summary = "User's roles",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Effective roles of the user", body = Vec<Role>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required unless asking about yourself"),
        (status = 404, description = "User not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_roles(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Vec<Role>>> {
    let id = UserResource::parse_id(&id)?;
    require_root_or_self(&principal, id)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = UserResource::find_one_or_fail(&mut conn, id).await?;

    Ok(Json(user.roles()))
}

#[utoipa::path(
    post,
    path = "/v1/user/{id}/group/{group_id}",
    tag = "user",
    summary = "Attach user to group",
    params(
        ("id" = String, Path, description = "User ID"),
        ("group_id" = String, Path, description = "User group ID"),
    ),
    responses(
        (status = 201, description = "Attached, the user's groups", body = Vec<UserGroupResponse>),
        (status = 200, description = "Already attached, the user's groups", body = Vec<UserGroupResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
        (status = 404, description = "User or group not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn attach_user_group(
    State(state): State<AppState>,
    _: RequiresRole<role::Root>,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Vec<UserGroupResponse>>)> {
    let id = UserResource::parse_id(&id)?;
    let group_id = UserGroupResource::parse_id(&group_id)?;

    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    UserResource::find_one_or_fail(&mut tx, id).await?;
    UserGroupResource::find_one_or_fail(&mut tx, group_id).await?;

    let added = Users::new(&mut tx).add_to_group(id, group_id).await?;
    let user = UserResource::find_one_or_fail(&mut tx, id).await?;
    tx.commit().await.map_err(DbError::from)?;

    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, group_responses(user.user_groups)))
}

#[utoipa::path(
    delete,
    path = "/v1/user/{id}/group/{group_id}",
    tag = "user",
    summary = "Detach user from group",
    params(
        ("id" = String, Path, description = "User ID"),
        ("group_id" = String, Path, description = "User group ID"),
    ),
    responses(
        (status = 200, description = "Detached, the user's remaining groups", body = Vec<UserGroupResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
        (status = 404, description = "User or group not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn detach_user_group(
    State(state): State<AppState>,
    _: RequiresRole<role::Root>,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<Json<Vec<UserGroupResponse>>> {
    let id = UserResource::parse_id(&id)?;
    let group_id = UserGroupResource::parse_id(&group_id)?;

    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    UserResource::find_one_or_fail(&mut tx, id).await?;
    UserGroupResource::find_one_or_fail(&mut tx, group_id).await?;

    Users::new(&mut tx).remove_from_group(id, group_id).await?;
    let user = UserResource::find_one_or_fail(&mut tx, id).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(group_responses(user.user_groups))
}

#[cfg(test)]
mod tests {
    use crate::auth::roles::Role;
    use crate::test_utils::{TEST_PASSWORD, bearer_token, create_test_group, create_test_server, create_test_user};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    fn new_user() -> Value {
        json!({
            "username": "jane",
            "firstName": "Jane",
            "lastName": "Doe",
            "email": "jane@example.com",
            "password": TEST_PASSWORD,
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_crud_status_codes_by_role() {
        let (server, state, _dir) = create_test_server().await;
        let root = bearer_token(&create_test_user(&state.db, "root", &[Role::Root]).await, &state.config);
        let admin = bearer_token(&create_test_user(&state.db, "admin", &[Role::Admin]).await, &state.config);

        server.post("/v1/user").json(&new_user()).await.assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/v1/user")
            .add_header("authorization", admin.as_str())
            .json(&new_user())
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .post("/v1/user")
            .add_header("authorization", root.as_str())
            .json(&new_user())
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["timezone"], "Europe/Helsinki");
        assert!(created.get("password").is_none());

        let found: Value = server
            .get(&format!("/v1/user/{id}"))
            .add_header("authorization", admin.as_str())
            .await
            .json();
        assert_eq!(found["username"], "jane");

        let patched = server
            .patch(&format!("/v1/user/{id}"))
            .add_header("authorization", root.as_str())
            .json(&json!({"firstName": "Janet"}))
            .await;
        patched.assert_status_ok();
        assert_eq!(patched.json::<Value>()["lastName"], "Doe");

        // PUT validates the request as a whole
        server
            .put(&format!("/v1/user/{id}"))
            .add_header("authorization", root.as_str())
            .json(&json!({"firstName": "Janet"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .delete(&format!("/v1/user/{id}"))
            .add_header("authorization", root.as_str())
            .await
            .assert_status_ok();
        server
            .get(&format!("/v1/user/{id}"))
            .add_header("authorization", admin.as_str())
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_writes_right_after_logged_requests() {
        let (server, state, _dir) = create_test_server().await;
        let root = bearer_token(&create_test_user(&state.db, "root", &[Role::Root]).await, &state.config);
        let user = create_test_user(&state.db, "jane", &[Role::User]).await;
        let path = format!("/v1/user/{}", user.id);

        // Each GET spawns a request log insert that races the following write
        for i in 0..20 {
            server.get(&path).add_header("authorization", root.as_str()).await.assert_status_ok();
            server
                .patch(&path)
                .add_header("authorization", root.as_str())
                .json(&json!({"firstName": format!("Jane {i}")}))
                .await
                .assert_status_ok();
        }

        server.get(&path).add_header("authorization", root.as_str()).await.assert_status_ok();
        server.delete(&path).add_header("authorization", root.as_str()).await.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_validation_and_conflicts() {
        let (server, state, _dir) = create_test_server().await;
        let root = bearer_token(&create_test_user(&state.db, "root", &[Role::Root]).await, &state.config);

        let mut invalid = new_user();
        invalid["email"] = json!("nope");
        let response = server
            .post("/v1/user")
            .add_header("authorization", root.as_str())
            .json(&invalid)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["propertyPath"], "email");

        server
            .post("/v1/user")
            .add_header("authorization", root.as_str())
            .json(&new_user())
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/v1/user")
            .add_header("authorization", root.as_str())
            .json(&new_user())
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[test_log::test(tokio::test)]
    async fn test_cannot_delete_yourself() {
        let (server, state, _dir) = create_test_server().await;
        let root = create_test_user(&state.db, "root", &[Role::Root]).await;
        let token = bearer_token(&root, &state.config);

        server
            .delete(&format!("/v1/user/{}", root.id))
            .add_header("authorization", token.as_str())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_groups_and_roles_for_root_or_self() {
        let (server, state, _dir) = create_test_server().await;
        let root = bearer_token(&create_test_user(&state.db, "root", &[Role::Root]).await, &state.config);
        let john = create_test_user(&state.db, "john", &[Role::User]).await;
        let john_token = bearer_token(&john, &state.config);
        let jane = create_test_user(&state.db, "jane", &[Role::Admin]).await;

        let roles: Vec<Role> = server
            .get(&format!("/v1/user/{}/roles", john.id))
            .add_header("authorization", john_token.as_str())
            .await
            .json();
        assert_eq!(roles, vec![Role::Logged, Role::User]);

        server
            .get(&format!("/v1/user/{}/groups", jane.id))
            .add_header("authorization", john_token.as_str())
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let groups: Vec<Value> = server
            .get(&format!("/v1/user/{}/groups", jane.id))
            .add_header("authorization", root.as_str())
            .await
            .json();
        assert_eq!(groups.len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_attach_and_detach_group() {
        let (server, state, _dir) = create_test_server().await;
        let root = bearer_token(&create_test_user(&state.db, "root", &[Role::Root]).await, &state.config);
        let john = create_test_user(&state.db, "john", &[]).await;
        let group = create_test_group(&state.db, "Admins", Role::Admin).await;
        let path = format!("/v1/user/{}/group/{}", john.id, group.id);

        let response = server.post(&path).add_header("authorization", root.as_str()).await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Vec<Value>>().len(), 1);

        server
            .post(&path)
            .add_header("authorization", root.as_str())
            .await
            .assert_status(StatusCode::OK);

        let response = server.delete(&path).add_header("authorization", root.as_str()).await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Value>>().is_empty());

        server
            .post(&format!("/v1/user/{}/group/{}", john.id, uuid::Uuid::new_v4()))
            .add_header("authorization", root.as_str())
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
