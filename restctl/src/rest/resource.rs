//! The generic REST resource.
//!
//! A [`RestResource`] ties an entity's repository to its request DTO and response shape, and
//! provides the operations every REST controller exposes:
//!
//! | operation | semantics |
//! | --- | --- |
//! | [`find`](RestResource::find) | entities matching the criteria |
//! | [`find_one`](RestResource::find_one) / [`find_one_or_fail`](RestResource::find_one_or_fail) | by id, the latter 404s |
//! | [`find_one_by`](RestResource::find_one_by) | first entity matching the criteria |
//! | [`count`](RestResource::count) / [`ids`](RestResource::ids) | number / ids of matches |
//! | [`create`](RestResource::create) | validate, convert, insert |
//! | [`update`](RestResource::update) | PUT: fresh DTO patched with the request |
//! | [`patch`](RestResource::patch) | PATCH: DTO loaded from the entity, patched with the request |
//! | [`delete`](RestResource::delete) | 404 if missing, returns the deleted entity |
//!
//! Only visited properties reach the database on PUT and PATCH; the difference between the two is
//! what gets validated.

use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;
use sqlx::SqliteConnection;

use crate::{
    AppState,
    auth::current_user::Principal,
    db::handlers::Repository,
    errors::{Error, Result},
    rest::{
        criteria::{Columns, SearchCriteria},
        dto::{Action, Properties, RestDto},
    },
};

#[async_trait::async_trait]
pub trait RestResource: Sized + Send + Sync + 'static {
    /// Entity name used in error messages, e.g. `User`.
    const NAME: &'static str;

    type Id: FromStr + Display + Serialize + Copy + Send + Sync + 'static;
    type Entity: Send + Sync + 'static;
    type Dto: RestDto<Entity = Self::Entity>;
    type Response: Serialize + From<Self::Entity> + Send + 'static;
    type CreateRequest: Send + Sync;
    type UpdateRequest: Send + Sync;
    type Repository<'c>: Repository<
            CreateRequest = Self::CreateRequest,
            UpdateRequest = Self::UpdateRequest,
            Response = Self::Entity,
            Id = Self::Id,
            Filter = SearchCriteria,
        > + Send;

    /// Columns clients may filter, order and search on.
    fn columns() -> &'static Columns;

    fn repository(db: &mut SqliteConnection) -> Self::Repository<'_>;

    /// Convert a validated DTO into an insert.
    async fn create_request(state: &AppState, dto: &Self::Dto) -> Result<Self::CreateRequest>;

    /// Convert a validated DTO into an update touching only its visited properties.
    async fn update_request(state: &AppState, dto: &Self::Dto) -> Result<Self::UpdateRequest>;

    /// Runs before an entity is deleted; fail to veto the delete.
    async fn before_delete(_principal: &Principal, _entity: &Self::Entity) -> Result<()> {
        Ok(())
    }

    fn not_found(id: &dyn Display) -> Error {
        Error::NotFound {
            resource: Self::NAME.to_string(),
            id: id.to_string(),
        }
    }

    /// Parse an id from a path segment. Ids that cannot exist are reported as not found.
    fn parse_id(raw: &str) -> Result<Self::Id> {
        raw.parse().map_err(|_| Self::not_found(&raw))
    }

    async fn find(db: &mut SqliteConnection, criteria: &SearchCriteria) -> Result<Vec<Self::Entity>> {
        Ok(Self::repository(db).list(criteria).await?)
    }

    async fn find_one(db: &mut SqliteConnection, id: Self::Id) -> Result<Option<Self::Entity>> {
        Ok(Self::repository(db).get_by_id(id).await?)
    }

    async fn find_one_or_fail(db: &mut SqliteConnection, id: Self::Id) -> Result<Self::Entity> {
        Self::find_one(db, id).await?.ok_or_else(|| Self::not_found(&id))
    }

    async fn find_one_by(db: &mut SqliteConnection, criteria: SearchCriteria) -> Result<Option<Self::Entity>> {
        let criteria = criteria.with_limit(1);
        Ok(Self::repository(db).list(&criteria).await?.into_iter().next())
    }

    async fn count(db: &mut SqliteConnection, criteria: &SearchCriteria) -> Result<i64> {
        Ok(Self::repository(db).count(criteria).await?)
    }

    async fn ids(db: &mut SqliteConnection, criteria: &SearchCriteria) -> Result<Vec<Self::Id>> {
        Ok(Self::repository(db).ids(criteria).await?)
    }

    async fn create(state: &AppState, db: &mut SqliteConnection, dto: &Self::Dto) -> Result<Self::Entity> {
        dto.validate_for(Action::Create)?;
        let request = Self::create_request(state, dto).await?;
        Ok(Self::repository(db).create(&request).await?)
    }

    async fn update(state: &AppState, db: &mut SqliteConnection, id: Self::Id, dto: &Self::Dto) -> Result<Self::Entity> {
        Self::find_one_or_fail(db, id).await?;

        let mut replacement = <Self::Dto as Default>::default();
        replacement.patch(dto);
        replacement.validate_for(Action::Update)?;

        let request = Self::update_request(state, &replacement).await?;
        Ok(Self::repository(db).update(id, &request).await?)
    }

    async fn patch(state: &AppState, db: &mut SqliteConnection, id: Self::Id, dto: &Self::Dto) -> Result<Self::Entity> {
        let entity = Self::find_one_or_fail(db, id).await?;

        let merged = <Self::Dto as RestDto>::merged(&entity, dto);
        merged.validate_for(Action::Patch)?;

        let request = Self::update_request(state, &merged).await?;
        Ok(Self::repository(db).update(id, &request).await?)
    }

    async fn delete(db: &mut SqliteConnection, principal: &Principal, id: Self::Id) -> Result<Self::Entity> {
        let entity = Self::find_one_or_fail(db, id).await?;
        Self::before_delete(principal, &entity).await?;

        if !Self::repository(db).delete(id).await? {
            return Err(Self::not_found(&id));
        }
        Ok(entity)
    }
}
