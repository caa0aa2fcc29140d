//! User group controller: the generic CRUD actions plus membership.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    AppState,
    api::models::users::UserResponse,
    auth::{permissions::RequiresRole, roles::role},
    db::{self, errors::DbError, handlers::Users},
    errors::Result,
    resources::{UserGroupResource, UserResource},
    rest::{actions, resource::RestResource},
    types::UserGroupId,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/user_group",
            get(actions::find::<UserGroupResource, role::Admin>).post(actions::create::<UserGroupResource, role::Root>),
        )
        .route("/v1/user_group/count", get(actions::count::<UserGroupResource, role::Admin>))
        .route("/v1/user_group/ids", get(actions::ids::<UserGroupResource, role::Admin>))
        .route(
            "/v1/user_group/{id}",
            get(actions::find_one::<UserGroupResource, role::Admin>)
                .put(actions::update::<UserGroupResource, role::Root>)
                .patch(actions::patch::<UserGroupResource, role::Root>)
                .delete(actions::delete::<UserGroupResource, role::Root>),
        )
        .route("/v1/user_group/{id}/users", get(get_user_group_users))
        .route(
            "/v1/user_group/{id}/user/{user_id}",
            post(attach_user).delete(detach_user),
        )
}

async fn members(conn: &mut sqlx::SqliteConnection, group_id: UserGroupId) -> Result<Json<Vec<UserResponse>>> {
    let users = Users::new(conn).list_by_group(group_id).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/user_group/{id}/users",
    tag = "user_group",
    summary = "Members of a group",
    params(("id" = String, Path, description = "User group ID")),
    responses(
        (status = 200, description = "Users in the group", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
        (status = 404, description = "User group not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_group_users(
    State(state): State<AppState>,
    _: RequiresRole<role::Admin>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserResponse>>> {
    let id = UserGroupResource::parse_id(&id)?;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    UserGroupResource::find_one_or_fail(&mut conn, id).await?;

    members(&mut conn, id).await
}

#[utoipa::path(
    post,
    path = "/v1/user_group/{id}/user/{user_id}",
    tag = "user_group",
    summary = "Attach user to group",
    params(
        ("id" = String, Path, description = "User group ID"),
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 201, description = "Attached, the group's members", body = Vec<UserResponse>),
        (status = 200, description = "Already attached, the group's members", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
        (status = 404, description = "User or group not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn attach_user(
    State(state): State<AppState>,
    _: RequiresRole<role::Root>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Vec<UserResponse>>)> {
    let id = UserGroupResource::parse_id(&id)?;
    let user_id = UserResource::parse_id(&user_id)?;

    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    UserGroupResource::find_one_or_fail(&mut tx, id).await?;
    UserResource::find_one_or_fail(&mut tx, user_id).await?;

    let added = Users::new(&mut tx).add_to_group(user_id, id).await?;
    let users = members(&mut tx, id).await?;
    tx.commit().await.map_err(DbError::from)?;

    let status = if added { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, users))
}

#[utoipa::path(
    delete,
    path = "/v1/user_group/{id}/user/{user_id}",
    tag = "user_group",
    summary = "Detach user from group",
    params(
        ("id" = String, Path, description = "User group ID"),
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Detached, the group's remaining members", body = Vec<UserResponse>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ROOT required"),
        (status = 404, description = "User or group not found"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn detach_user(
    State(state): State<AppState>,
    _: RequiresRole<role::Root>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<Vec<UserResponse>>> {
    let id = UserGroupResource::parse_id(&id)?;
    let user_id = UserResource::parse_id(&user_id)?;

    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    UserGroupResource::find_one_or_fail(&mut tx, id).await?;
    UserResource::find_one_or_fail(&mut tx, user_id).await?;

    Users::new(&mut tx).remove_from_group(user_id, id).await?;
    let users = members(&mut tx, id).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(users)
}
