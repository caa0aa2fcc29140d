//! Request and login audit logging.
//!
//! Every handled request (except `OPTIONS` and ignored route prefixes) is written to
//! `log_requests` by [`middleware::log_requests`]. Login attempts are written to `log_logins` by
//! the token endpoint through [`logins`].
//!
//! The middleware runs outside the handlers, so it cannot see who authenticated. It inserts an
//! empty [`PrincipalSlot`] into the request extensions instead; the authentication extractor fills
//! it and the middleware reads it back once the response is ready.
//!
//! Sensitive headers and body fields are replaced before anything is stored, see [`sanitize`].
//! Old rows are removed by [`cleanup`].

use std::sync::{Arc, OnceLock};

use crate::types::{ApiKeyId, UserId};

pub mod cleanup;
pub mod client;
pub mod logins;
pub mod middleware;
pub mod sanitize;

pub use client::ClientInfo;

/// Ids of the authenticated principal of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrincipalIds {
    pub user_id: Option<UserId>,
    pub api_key_id: Option<ApiKeyId>,
}

/// Write-once slot shared between the logging middleware and the authentication extractor.
#[derive(Debug, Clone, Default)]
pub struct PrincipalSlot(Arc<OnceLock<PrincipalIds>>);

impl PrincipalSlot {
    /// Record the principal. Later calls are ignored.
    pub fn record(&self, ids: PrincipalIds) {
        let _ = self.0.set(ids);
    }

    /// The recorded principal, or empty ids for anonymous requests.
    pub fn get(&self) -> PrincipalIds {
        self.0.get().copied().unwrap_or_default()
    }
}
