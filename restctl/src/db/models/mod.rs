//! Database record structures.
//!
//! Each entity has a `*CreateDBRequest`, an optional `*UpdateDBRequest` whose `None` fields are
//! left untouched, and a `*DBResponse` returned by the repositories.

pub mod api_keys;
pub mod logs;
pub mod roles;
pub mod user_groups;
pub mod users;
