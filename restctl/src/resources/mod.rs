//! [`RestResource`](crate::rest::resource::RestResource) implementations and their request DTOs.
//!
//! | resource | DTO | repository |
//! | --- | --- | --- |
//! | [`RoleResource`] | [`RoleDto`] | [`Roles`](crate::db::handlers::Roles) |
//! | [`UserGroupResource`] | [`UserGroupDto`] | [`UserGroups`](crate::db::handlers::UserGroups) |
//! | [`UserResource`] | [`UserDto`] | [`Users`](crate::db::handlers::Users) |
//! | [`ApiKeyResource`] | [`ApiKeyDto`] | [`ApiKeys`](crate::db::handlers::ApiKeys) |

pub mod api_keys;
pub mod roles;
pub mod user_groups;
pub mod users;

pub use api_keys::{ApiKeyDto, ApiKeyResource};
pub use roles::{RoleDto, RoleResource};
pub use user_groups::{UserGroupDto, UserGroupResource};
pub use users::{UserDto, UserResource};

/// Message for a required property that is missing or empty.
pub(crate) const NOT_BLANK: &str = "This value should not be blank.";

/// Message for a value outside the allowed set.
pub(crate) const NOT_A_CHOICE: &str = "The value you selected is not a valid choice.";
