//! API response models for users.

use crate::api::models::user_groups::UserGroupResponse;
use crate::auth::roles::Role;
use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A user as returned by the user endpoints. The password hash is never exposed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
    pub locale: String,
    pub timezone: String,
    pub user_groups: Vec<UserGroupResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            first_name: db.first_name,
            last_name: db.last_name,
            email: db.email,
            language: db.language,
            locale: db.locale,
            timezone: db.timezone,
            user_groups: db.user_groups.into_iter().map(Into::into).collect(),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// The current user, as returned by `/v1/profile`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    /// Effective roles, expanded through the hierarchy
    pub roles: Vec<Role>,
}

impl From<UserDBResponse> for ProfileResponse {
    fn from(db: UserDBResponse) -> Self {
        let roles = db.roles();
        Self { user: db.into(), roles }
    }
}
