//! User groups as a REST resource.

use serde::Deserialize;
use sqlx::SqliteConnection;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    AppState,
    api::models::user_groups::UserGroupResponse,
    auth::roles::Role,
    db::{
        handlers::{UserGroups, user_groups::COLUMNS},
        models::user_groups::{UserGroupCreateDBRequest, UserGroupDBResponse, UserGroupUpdateDBRequest},
    },
    errors::{Error, Result, Violation},
    resources::NOT_BLANK,
    rest::{
        criteria::Columns,
        dto::{Action, Properties, RestDto, validate_with},
        resource::RestResource,
    },
    types::UserGroupId,
};

crate::rest_dto! {
    #[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
    pub struct UserGroupDto {
        #[validate(length(min = 2, max = 255, message = "This value should have between 2 and 255 characters."))]
        name: String => "name",
        role: Option<Role> => "role",
    }
}

impl RestDto for UserGroupDto {
    type Entity = UserGroupDBResponse;

    fn load(&mut self, entity: &UserGroupDBResponse) {
        self.name = entity.name.clone();
        self.role = Some(entity.role);
    }

    fn validate_for(&self, _action: Action) -> Result<()> {
        let mut extra = Vec::new();
        if self.role.is_none() {
            extra.push(Violation::new("role", NOT_BLANK));
        }
        validate_with(self, extra)
    }
}

pub struct UserGroupResource;

#[async_trait::async_trait]
impl RestResource for UserGroupResource {
    const NAME: &'static str = "UserGroup";

    type Id = UserGroupId;
    type Entity = UserGroupDBResponse;
    type Dto = UserGroupDto;
    type Response = UserGroupResponse;
    type CreateRequest = UserGroupCreateDBRequest;
    type UpdateRequest = UserGroupUpdateDBRequest;
    type Repository<'c> = UserGroups<'c>;

    fn columns() -> &'static Columns {
        &COLUMNS
    }

    fn repository(db: &mut SqliteConnection) -> UserGroups<'_> {
        UserGroups::new(db)
    }

    async fn create_request(_state: &AppState, dto: &UserGroupDto) -> Result<UserGroupCreateDBRequest> {
        let role = dto.role.ok_or_else(|| Error::Validation {
            violations: vec![Violation::new("role", NOT_BLANK)],
        })?;
        Ok(UserGroupCreateDBRequest {
            name: dto.name.clone(),
            role,
        })
    }

    async fn update_request(_state: &AppState, dto: &UserGroupDto) -> Result<UserGroupUpdateDBRequest> {
        Ok(UserGroupUpdateDBRequest {
            name: dto.is_visited("name").then(|| dto.name.clone()),
            role: if dto.is_visited("role") { dto.role } else { None },
        })
    }
}
