//! Extractors for the authenticated caller.
//!
//! Two credentials are accepted in the `Authorization` header:
//!
//! - `Bearer <jwt>`: a token issued by `/v1/auth/get_token`. The user is reloaded from the
//!   database on every request, so deleted users and changed group memberships take effect
//!   immediately.
//! - `ApiKey <token>`: an API key, authenticated as an [`Principal::ApiKey`].
//!
//! The resolved principal is cached in the request extensions and recorded in the request log.

use crate::{
    AppState,
    auth::{api_keys, roles::Role, session},
    db::{
        handlers::{ApiKeys, Repository, Users},
        models::{api_keys::ApiKeyDBResponse, users::UserDBResponse},
    },
    errors::{Error, Result},
    request_logging::{PrincipalIds, PrincipalSlot},
    types::{ApiKeyId, UserId, abbrev_uuid},
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, instrument, trace};

/// The authenticated caller.
#[derive(Debug, Clone)]
pub enum Principal {
    User(UserDBResponse),
    ApiKey(ApiKeyDBResponse),
}

impl Principal {
    /// Effective roles, expanded through the hierarchy.
    pub fn roles(&self) -> Vec<Role> {
        match self {
            Principal::User(user) => user.roles(),
            Principal::ApiKey(key) => key.roles(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Principal::User(user) => Some(user.id),
            Principal::ApiKey(_) => None,
        }
    }

    pub fn api_key_id(&self) -> Option<ApiKeyId> {
        match self {
            Principal::User(_) => None,
            Principal::ApiKey(key) => Some(key.id),
        }
    }
}

/// Resolve a `Bearer` token to its user.
/// Returns:
/// - None: No bearer token present
/// - Some(Ok(principal)): Valid token of an existing user
/// - Some(Err(error)): Token present but invalid, expired, or its user is gone
#[instrument(skip_all)]
async fn try_jwt_auth(header: &str, state: &AppState) -> Option<Result<Principal>> {
    let token = header.strip_prefix("Bearer ")?.trim();

    let claims = match session::verify_session_token(token, &state.config) {
        Ok(claims) => claims,
        Err(e) => return Some(Err(e)),
    };

    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Some(Err(crate::db::errors::DbError::from(e).into())),
    };

    match Users::new(&mut conn).get_by_id(claims.sub).await {
        Ok(Some(user)) => Some(Ok(Principal::User(user))),
        Ok(None) => {
            debug!(user_id = %abbrev_uuid(&claims.sub), "Token refers to a deleted user");
            Some(Err(Error::Unauthenticated {
                message: Some("Invalid JWT Token".to_string()),
            }))
        }
        Err(e) => Some(Err(e.into())),
    }
}

/// Resolve an `ApiKey` token.
/// Returns:
/// - None: No API key present
/// - Some(Ok(principal)): Known API key
/// - Some(Err(error)): Unknown key or lookup failure
#[instrument(skip_all)]
async fn try_api_key_auth(header: &str, state: &AppState) -> Option<Result<Principal>> {
    let token = api_keys::parse_authorization(header)?;

    let mut conn = match state.db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Some(Err(crate::db::errors::DbError::from(e).into())),
    };

    match ApiKeys::new(&mut conn).get_by_token(token).await {
        Ok(Some(key)) => Some(Ok(Principal::ApiKey(key))),
        Ok(None) => Some(Err(Error::Unauthenticated {
            message: Some("Invalid API key".to_string()),
        })),
        Err(e) => Some(Err(e.into())),
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|e| Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            })?,
            None => {
                trace!("No authentication credentials found in request");
                return Err(Error::Unauthenticated {
                    message: Some("JWT Token not found".to_string()),
                });
            }
        };

        let attempt = match try_jwt_auth(header, state).await {
            Some(result) => Some(result),
            None => try_api_key_auth(header, state).await,
        };

        let principal = match attempt {
            Some(result) => result?,
            None => {
                trace!("Unsupported authorization scheme");
                return Err(Error::Unauthenticated {
                    message: Some("JWT Token not found".to_string()),
                });
            }
        };

        if let Some(slot) = parts.extensions.get::<PrincipalSlot>() {
            slot.record(PrincipalIds {
                user_id: principal.user_id(),
                api_key_id: principal.api_key_id(),
            });
        }
        parts.extensions.insert(principal.clone());

        Ok(principal)
    }
}

/// An authenticated user. API keys are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserDBResponse);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match Principal::from_request_parts(parts, state).await? {
            Principal::User(user) => Ok(CurrentUser(user)),
            Principal::ApiKey(_) => Err(Error::Unauthenticated {
                message: Some("This endpoint requires a user token".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_api_key, create_test_state, create_test_user};
    use axum::http::Request;

    fn parts_with_authorization(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/v1/profile");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_header_returns_unauthorized() {
        let (state, _dir) = create_test_state().await;
        let mut parts = parts_with_authorization(None);

        let result = Principal::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_bearer_token_loads_user_and_records_slot() {
        let (state, _dir) = create_test_state().await;
        let user = create_test_user(&state.db, "john", &[Role::Admin]).await;
        let token = session::create_session_token(&user, &state.config).unwrap();

        let mut parts = parts_with_authorization(Some(&format!("Bearer {token}")));
        let slot = PrincipalSlot::default();
        parts.extensions.insert(slot.clone());

        let principal = Principal::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.user_id(), Some(user.id));
        assert!(principal.has_role(Role::User));
        assert!(!principal.has_role(Role::Root));
        assert_eq!(slot.get().user_id, Some(user.id));

        // Cached for later extractors
        assert!(parts.extensions.get::<Principal>().is_some());
    }

    #[test_log::test(tokio::test)]
    async fn test_token_of_deleted_user_is_rejected() {
        let (state, _dir) = create_test_state().await;
        let user = create_test_user(&state.db, "john", &[]).await;
        let token = session::create_session_token(&user, &state.config).unwrap();

        let mut conn = state.db.acquire().await.unwrap();
        Users::new(&mut conn).delete(user.id).await.unwrap();

        let mut parts = parts_with_authorization(Some(&format!("Bearer {token}")));
        let result = Principal::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_api_key_auth() {
        let (state, _dir) = create_test_state().await;
        let key = create_test_api_key(&state.db, &[Role::User]).await;

        let mut parts = parts_with_authorization(Some(&format!("ApiKey {}", key.token)));
        let principal = Principal::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(principal.api_key_id(), Some(key.id));
        assert!(principal.has_role(Role::Api));
        assert!(principal.has_role(Role::User));

        // API keys cannot act as users
        let mut parts = parts_with_authorization(Some(&format!("ApiKey {}", key.token)));
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));

        let mut parts = parts_with_authorization(Some("ApiKey wrong"));
        let result = Principal::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }
}
