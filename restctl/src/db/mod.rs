//! Database layer for data persistence and access.
//!
//! SQLx over SQLite, schema managed by the embedded migrations in `migrations/`.
//!
//! ```text
//! ┌──────────────────┐
//! │ REST resources / │  (rest::resource, api::handlers)
//! │ handlers         │
//! └────────┬─────────┘
//!          ↓
//! ┌──────────────────┐
//! │ Repositories     │  (db::handlers - queries)
//! └────────┬─────────┘
//!          ↓
//! ┌──────────────────┐
//! │ Models           │  (db::models - database records)
//! └────────┬─────────┘
//!          ↓
//! ┌──────────────────┐
//! │ SQLite           │
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database request and response records
//! - [`errors`]: Database-specific error types
//!
//! # Storage notes
//!
//! - UUIDs are stored as 16 byte blobs, timestamps as RFC 3339 text.
//! - Roles are stored by name and parsed back into [`Role`](crate::auth::roles::Role).
//! - Foreign keys are enforced per connection (`PRAGMA foreign_keys = ON`), see
//!   [`crate::connect_pool`].
//! - Writes go through [`begin_write`]. A deferred transaction that reads first cannot upgrade
//!   its snapshot once another connection has committed (`SQLITE_BUSY_SNAPSHOT`), and the busy
//!   timeout does not retry that case.

pub mod errors;
pub mod handlers;
pub mod models;

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Begin a transaction holding the write lock from the start (`BEGIN IMMEDIATE`).
pub async fn begin_write(db: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    db.begin_with("BEGIN IMMEDIATE").await
}
