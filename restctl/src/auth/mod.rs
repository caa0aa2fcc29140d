//! Authentication and authorization.
//!
//! # Authentication
//!
//! - **JWT**: `POST /v1/auth/get_token` exchanges a username (or email) and password for a
//!   signed token, sent back as `Authorization: Bearer <token>`. See [`session`].
//! - **API keys**: `Authorization: ApiKey <token>` with a key created through `/v1/api_key`.
//!   See [`api_keys`].
//!
//! # Authorization
//!
//! Access is granted by role. Users hold `ROLE_LOGGED`, API keys `ROLE_API`, and both gain the
//! roles of their user groups, expanded through the hierarchy in [`roles`]. Handlers require a
//! minimum role with [`permissions::RequiresRole`].
//!
//! # Modules
//!
//! - [`api_keys`]: API key token generation and header parsing
//! - [`current_user`]: Extractors for the authenticated principal
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Role checks
//! - [`roles`]: Roles, the role hierarchy and role marker types
//! - [`session`]: JWT creation and verification

pub mod api_keys;
pub mod current_user;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod session;
