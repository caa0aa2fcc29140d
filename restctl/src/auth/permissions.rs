//! Role based access checks.
//!
//! Handlers declare the minimum role they need with the [`RequiresRole`] extractor:
//!
//! ```ignore
//! async fn handler(RequiresRole(principal, ..): RequiresRole<role::Admin>) -> Result<Json<()>> {
//!     // `principal` holds ROLE_ADMIN, directly or through the hierarchy
//! }
//! ```
//!
//! Missing or invalid credentials are rejected with 401, a principal without the role with 403.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    AppState,
    auth::{
        current_user::Principal,
        roles::{Role, role::RoleMarker},
    },
    errors::{Error, Result},
    types::UserId,
};

/// An authenticated principal holding `A::ROLE`.
#[derive(Debug)]
pub struct RequiresRole<A: RoleMarker>(pub Principal, pub PhantomData<A>);

impl<A: RoleMarker> RequiresRole<A> {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl<A: RoleMarker> FromRequestParts<AppState> for RequiresRole<A> {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let principal = Principal::from_request_parts(parts, state).await?;
        require_role(&principal, A::ROLE)?;
        Ok(RequiresRole(principal, PhantomData))
    }
}

/// Fail with 403 unless the principal holds `role`.
pub fn require_role(principal: &Principal, role: Role) -> Result<()> {
    if principal.has_role(role) {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions { required: role })
    }
}

/// Fail with 403 unless the principal is the given user or holds ROLE_ROOT.
pub fn require_root_or_self(principal: &Principal, user_id: UserId) -> Result<()> {
    if principal.user_id() == Some(user_id) {
        return Ok(());
    }
    require_role(principal, Role::Root)
}
