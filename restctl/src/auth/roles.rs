//! Security roles and the role hierarchy.
//!
//! ```text
//! ROLE_ROOT ──► ROLE_ADMIN ──► ROLE_USER ──► ROLE_LOGGED
//!                                   ROLE_API ──► ROLE_LOGGED
//! ```
//!
//! Every authenticated principal holds `ROLE_LOGGED`: users directly, API keys through
//! `ROLE_API`. Group memberships add the group's role, which is then expanded through the
//! hierarchy above.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "ROLE_LOGGED")]
    Logged,
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_ROOT")]
    Root,
    #[serde(rename = "ROLE_API")]
    Api,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Logged, Role::User, Role::Admin, Role::Root, Role::Api];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Logged => "ROLE_LOGGED",
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
            Role::Root => "ROLE_ROOT",
            Role::Api => "ROLE_API",
        }
    }

    /// Roles this role directly includes.
    fn parents(&self) -> &'static [Role] {
        match self {
            Role::Root => &[Role::Admin],
            Role::Admin => &[Role::User],
            Role::User | Role::Api => &[Role::Logged],
            Role::Logged => &[],
        }
    }

    /// The role itself followed by every role reachable through the hierarchy.
    pub fn inherited(&self) -> Vec<Role> {
        reachable(&[*self])
    }
}

/// De-duplicated union of the inherited roles of `roles`, in discovery order.
pub fn reachable(roles: &[Role]) -> Vec<Role> {
    let mut result: Vec<Role> = Vec::with_capacity(Role::ALL.len());
    let mut stack: Vec<Role> = roles.iter().rev().copied().collect();

    while let Some(role) = stack.pop() {
        if result.contains(&role) {
            continue;
        }
        result.push(role);
        stack.extend(role.parents().iter().rev());
    }

    result
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Marker types naming the minimum role for an operation, used by
/// [`crate::auth::permissions::RequiresRole`].
pub mod role {
    use super::Role;

    pub trait RoleMarker: Send + Sync + 'static {
        const ROLE: Role;
    }

    macro_rules! role_marker {
        ($($name:ident => $role:expr),* $(,)?) => {
            $(
                pub struct $name;

                impl RoleMarker for $name {
                    const ROLE: Role = $role;
                }
            )*
        };
    }

    role_marker! {
        Logged => Role::Logged,
        User => Role::User,
        Admin => Role::Admin,
        Root => Role::Root,
        Api => Role::Api,
    }
}
