//! Database models for users.

use crate::auth::roles::{Role, reachable};
use crate::db::models::user_groups::UserGroupDBResponse;
use crate::types::{UserGroupId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
    pub locale: String,
    pub timezone: String,
    pub password_hash: String,
    pub user_groups: Vec<UserGroupId>,
}

/// Database request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub password_hash: Option<String>,
    /// Replaces the user's memberships when set
    pub user_groups: Option<Vec<UserGroupId>>,
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
    pub locale: String,
    pub timezone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_groups: Vec<UserGroupDBResponse>,
}

impl UserDBResponse {
    /// Effective roles: `ROLE_LOGGED` plus group roles, expanded through the hierarchy.
    pub fn roles(&self) -> Vec<Role> {
        let mut direct = vec![Role::Logged];
        direct.extend(self.user_groups.iter().map(|g| g.role));
        let mut roles = reachable(&direct);
        roles.sort();
        roles
    }
}
