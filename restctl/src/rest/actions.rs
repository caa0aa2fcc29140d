//! Generic axum handlers for [`RestResource`]s.
//!
//! Each action is generic over the resource and over the role marker naming the minimum role
//! required to call it, so a controller is assembled from plain function instantiations:
//!
//! ```ignore
//! Router::new()
//!     .route("/v1/user_group", get(actions::find::<UserGroupResource, role::Admin>))
//!     .route("/v1/user_group", post(actions::create::<UserGroupResource, role::Root>))
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    AppState,
    auth::{permissions::RequiresRole, roles::role::RoleMarker},
    db::{self, errors::DbError},
    errors::Result,
    rest::{criteria::SearchCriteria, mapper::MappedDto, resource::RestResource},
};

/// Query string as ordered key/value pairs, so repeated and bracketed keys survive.
pub type QueryPairs = Query<Vec<(String, String)>>;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn find<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    Query(params): QueryPairs,
) -> Result<Json<Vec<R::Response>>> {
    let criteria = SearchCriteria::parse(&params, R::columns())?;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let entities = R::find(&mut conn, &criteria).await?;
    Ok(Json(entities.into_iter().map(R::Response::from).collect()))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn count<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    Query(params): QueryPairs,
) -> Result<Json<CountResponse>> {
    let criteria = SearchCriteria::parse(&params, R::columns())?;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let count = R::count(&mut conn, &criteria).await?;
    Ok(Json(CountResponse { count }))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn ids<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    Query(params): QueryPairs,
) -> Result<Json<Vec<R::Id>>> {
    let criteria = SearchCriteria::parse(&params, R::columns())?;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    Ok(Json(R::ids(&mut conn, &criteria).await?))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn find_one<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    Path(id): Path<String>,
) -> Result<Json<R::Response>> {
    let id = R::parse_id(&id)?;
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;

    let entity = R::find_one_or_fail(&mut conn, id).await?;
    Ok(Json(entity.into()))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn create<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    MappedDto(dto): MappedDto<R::Dto>,
) -> Result<(StatusCode, Json<R::Response>)> {
    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    let entity = R::create(&state, &mut tx, &dto).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(entity.into())))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn update<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    Path(id): Path<String>,
    MappedDto(dto): MappedDto<R::Dto>,
) -> Result<Json<R::Response>> {
    let id = R::parse_id(&id)?;
    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    let entity = R::update(&state, &mut tx, id, &dto).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(entity.into()))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn patch<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    _: RequiresRole<A>,
    Path(id): Path<String>,
    MappedDto(dto): MappedDto<R::Dto>,
) -> Result<Json<R::Response>> {
    let id = R::parse_id(&id)?;
    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    let entity = R::patch(&state, &mut tx, id, &dto).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(entity.into()))
}

#[instrument(skip_all, fields(resource = R::NAME))]
pub async fn delete<R: RestResource, A: RoleMarker>(
    State(state): State<AppState>,
    RequiresRole(principal, _): RequiresRole<A>,
    Path(id): Path<String>,
) -> Result<Json<R::Response>> {
    let id = R::parse_id(&id)?;
    let mut tx = db::begin_write(&state.db).await.map_err(DbError::from)?;
    let entity = R::delete(&mut tx, &principal, id).await?;
    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(entity.into()))
}
