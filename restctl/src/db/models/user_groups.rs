//! Database models for user groups.

use crate::auth::roles::Role;
use crate::types::UserGroupId;
use chrono::{DateTime, Utc};

/// Database request for creating a user group
#[derive(Debug, Clone)]
pub struct UserGroupCreateDBRequest {
    pub name: String,
    pub role: Role,
}

/// Database request for updating a user group
#[derive(Debug, Clone, Default)]
pub struct UserGroupUpdateDBRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// Database response for a user group
#[derive(Debug, Clone, PartialEq)]
pub struct UserGroupDBResponse {
    pub id: UserGroupId,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
