//! HTTP handlers, one module per controller.
//!
//! CRUD endpoints are instantiations of the generic [`crate::rest::actions`]; the modules here
//! route them and add the endpoints that do not fit the generic shape (membership, roles, token
//! issuing, profile, localization). Each module exposes `routes()`, merged by
//! [`crate::build_router`].

pub mod api_keys;
pub mod auth;
pub mod localization;
pub mod profile;
pub mod roles;
pub mod system;
pub mod user_groups;
pub mod users;
