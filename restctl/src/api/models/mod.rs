//! API response models.
//!
//! Field names are serialized in camelCase. Request bodies of the CRUD endpoints are the DTOs in
//! [`crate::resources`].

pub mod api_keys;
pub mod auth;
pub mod localization;
pub mod roles;
pub mod system;
pub mod user_groups;
pub mod users;
