//! API keys as a REST resource. Tokens are generated on create and never change.

use serde::Deserialize;
use sqlx::SqliteConnection;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    AppState,
    api::models::api_keys::ApiKeyResponse,
    auth::api_keys::generate_token,
    db::{
        handlers::{ApiKeys, api_keys::COLUMNS},
        models::api_keys::{ApiKeyCreateDBRequest, ApiKeyDBResponse, ApiKeyUpdateDBRequest},
    },
    errors::Result,
    rest::{
        criteria::Columns,
        dto::{Properties, RestDto},
        resource::RestResource,
    },
    types::{ApiKeyId, UserGroupId},
};

crate::rest_dto! {
    #[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct ApiKeyDto {
        #[validate(length(min = 1, message = "This value should not be blank."))]
        description: String => "description",
        #[schema(value_type = Vec<String>)]
        user_groups: Vec<UserGroupId> => "userGroups",
    }
}

impl RestDto for ApiKeyDto {
    type Entity = ApiKeyDBResponse;

    fn load(&mut self, entity: &ApiKeyDBResponse) {
        self.description = entity.description.clone();
        self.user_groups = entity.user_groups.iter().map(|g| g.id).collect();
    }
}

pub struct ApiKeyResource;

#[async_trait::async_trait]
impl RestResource for ApiKeyResource {
    const NAME: &'static str = "ApiKey";

    type Id = ApiKeyId;
    type Entity = ApiKeyDBResponse;
    type Dto = ApiKeyDto;
    type Response = ApiKeyResponse;
    type CreateRequest = ApiKeyCreateDBRequest;
    type UpdateRequest = ApiKeyUpdateDBRequest;
    type Repository<'c> = ApiKeys<'c>;

    fn columns() -> &'static Columns {
        &COLUMNS
    }

    fn repository(db: &mut SqliteConnection) -> ApiKeys<'_> {
        ApiKeys::new(db)
    }

    async fn create_request(_state: &AppState, dto: &ApiKeyDto) -> Result<ApiKeyCreateDBRequest> {
        Ok(ApiKeyCreateDBRequest {
            token: generate_token(),
            description: dto.description.clone(),
            user_groups: dto.user_groups.clone(),
        })
    }

    async fn update_request(_state: &AppState, dto: &ApiKeyDto) -> Result<ApiKeyUpdateDBRequest> {
        Ok(ApiKeyUpdateDBRequest {
            description: dto.is_visited("description").then(|| dto.description.clone()),
            user_groups: dto.is_visited("userGroups").then(|| dto.user_groups.clone()),
        })
    }
}
