//! The generic REST layer.
//!
//! ```text
//! request ──► actions (axum handlers, role check)
//!               │  query string ──► criteria::SearchCriteria
//!               │  JSON body    ──► mapper::MappedDto ──► dto (visited properties)
//!               ▼
//!          resource::RestResource ──► db::handlers::Repository
//! ```
//!
//! - [`criteria`]: `where` / `order` / `limit` / `offset` / `search` parameters
//! - [`dto`]: request DTOs and the [`rest_dto!`](crate::rest_dto) macro
//! - [`mapper`]: JSON body to DTO extractor
//! - [`resource`]: the [`RestResource`](resource::RestResource) trait
//! - [`actions`]: generic handlers composed into controllers by [`crate::api`]

pub mod actions;
pub mod criteria;
pub mod dto;
pub mod mapper;
pub mod resource;
