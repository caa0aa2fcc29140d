//! Database models for API keys.

use crate::auth::roles::{Role, reachable};
use crate::db::models::user_groups::UserGroupDBResponse;
use crate::types::{ApiKeyId, UserGroupId};
use chrono::{DateTime, Utc};

/// Database request for creating an API key
#[derive(Debug, Clone)]
pub struct ApiKeyCreateDBRequest {
    pub token: String,
    pub description: String,
    pub user_groups: Vec<UserGroupId>,
}

/// Database request for updating an API key
#[derive(Debug, Clone, Default)]
pub struct ApiKeyUpdateDBRequest {
    pub description: Option<String>,
    /// Replaces the key's memberships when set
    pub user_groups: Option<Vec<UserGroupId>>,
}

/// Database response for an API key
#[derive(Debug, Clone)]
pub struct ApiKeyDBResponse {
    pub id: ApiKeyId,
    pub token: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_groups: Vec<UserGroupDBResponse>,
}

impl ApiKeyDBResponse {
    /// Effective roles: `ROLE_API` plus group roles, expanded through the hierarchy.
    pub fn roles(&self) -> Vec<Role> {
        let mut direct = vec![Role::Api];
        direct.extend(self.user_groups.iter().map(|g| g.role));
        let mut roles = reachable(&direct);
        roles.sort();
        roles
    }
}
