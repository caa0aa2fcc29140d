//! Role controller: the generic read actions plus the role hierarchy.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    AppState,
    auth::{
        permissions::RequiresRole,
        roles::{Role, role},
    },
    db::errors::DbError,
    errors::Result,
    resources::RoleResource,
    rest::{actions, resource::RestResource},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/role", get(actions::find::<RoleResource, role::Admin>))
        .route("/v1/role/count", get(actions::count::<RoleResource, role::Admin>))
        .route("/v1/role/ids", get(actions::ids::<RoleResource, role::Admin>))
        .route("/v1/role/{role}", get(actions::find_one::<RoleResource, role::Admin>))
        .route("/v1/role/{role}/inherited", get(get_inherited_roles))
}

#[utoipa::path(
    get,
    path = "/v1/role/{role}/inherited",
    tag = "role",
    summary = "Inherited roles",
    params(("role" = String, Path, description = "Role name, e.g. ROLE_ADMIN")),
    responses(
        (status = 200, description = "The role followed by every role it inherits", body = Vec<Role>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "ROLE_ADMIN required"),
        (status = 404, description = "Unknown role"),
    ),
    security(("BearerAuth" = []), ("ApiKeyAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_inherited_roles(
    State(state): State<AppState>,
    _: RequiresRole<role::Admin>,
    Path(role): Path<String>,
) -> Result<Json<Vec<Role>>> {
    let role = RoleResource::parse_id(&role)?;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let role = RoleResource::find_one_or_fail(&mut conn, role).await?;

    Ok(Json(role.id.inherited()))
}
