//! API response models for user groups.

use crate::auth::roles::Role;
use crate::db::models::user_groups::UserGroupDBResponse;
use crate::types::UserGroupId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserGroupId,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserGroupDBResponse> for UserGroupResponse {
    fn from(db: UserGroupDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            role: db.role,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
