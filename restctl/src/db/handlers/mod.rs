//! Repository implementations for database access.
//!
//! One repository per table, each wrapping a `&mut SqliteConnection` (a pooled connection or a
//! transaction) and returning models from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Roles`]: the seeded roles, identified by name
//! - [`UserGroups`]: groups granting a role to their members
//! - [`Users`]: user accounts and their group memberships
//! - [`ApiKeys`]: API keys and their group memberships
//! - [`LogRequests`], [`LogLogins`], [`LogLoginFailures`]: audit logs (append-only)
//! - [`Healthz`]: health check writes
//!
//! # Common Pattern
//!
//! ```ignore
//! use restctl::db::handlers::{Repository, Users};
//! use restctl::rest::criteria::SearchCriteria;
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Users::new(&mut tx);
//!
//!     let users = repo.list(&SearchCriteria::default()).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! Repositories that write several tables (users and API keys with their memberships) open a
//! nested transaction on the connection they were given, which SQLite runs as a savepoint when
//! the caller already holds a transaction.

pub mod api_keys;
pub mod healthz;
pub mod logs;
pub mod repository;
pub mod roles;
pub mod user_groups;
pub mod users;

pub use api_keys::ApiKeys;
pub use healthz::Healthz;
pub use logs::{LogLoginFailures, LogLogins, LogRequests};
pub use repository::Repository;
pub use roles::Roles;
pub use user_groups::UserGroups;
pub use users::Users;
