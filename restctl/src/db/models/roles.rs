//! Database models for roles.

use crate::auth::roles::Role;
use chrono::{DateTime, Utc};

/// Database request for creating a role
#[derive(Debug, Clone)]
pub struct RoleCreateDBRequest {
    pub id: Role,
    pub description: String,
}

/// Database request for updating a role
#[derive(Debug, Clone, Default)]
pub struct RoleUpdateDBRequest {
    pub description: Option<String>,
}

/// Database response for a role
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDBResponse {
    pub id: Role,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
