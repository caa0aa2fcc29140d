//! API response models for API keys.

use crate::api::models::user_groups::UserGroupResponse;
use crate::auth::roles::Role;
use crate::db::models::api_keys::ApiKeyDBResponse;
use crate::types::ApiKeyId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ApiKeyId,
    pub token: String,
    pub description: String,
    pub user_groups: Vec<UserGroupResponse>,
    /// Effective roles, expanded through the hierarchy
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiKeyDBResponse> for ApiKeyResponse {
    fn from(db: ApiKeyDBResponse) -> Self {
        let roles = db.roles();
        Self {
            id: db.id,
            token: db.token,
            description: db.description,
            user_groups: db.user_groups.into_iter().map(Into::into).collect(),
            roles,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
