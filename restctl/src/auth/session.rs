//! JWT token creation and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    auth::roles::Role,
    config::Config,
    db::models::users::UserDBResponse,
    errors::Error,
    types::UserId,
};

/// Claims of a session token.
///
/// `roles` is informational; authorization reloads the user and recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: UserId,
    pub username: String,
    pub roles: Vec<Role>,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(user: &UserDBResponse, config: &Config) -> Self {
        let issued_at = Utc::now();
        let expires_at = issued_at + config.auth.security.jwt_expiry;

        Self {
            sub: user.id,
            username: user.username.clone(),
            roles: user.roles(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}

const ALGORITHM: Algorithm = Algorithm::HS256;

fn secret(config: &Config) -> Result<&[u8], Error> {
    match config.secret_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(key.as_bytes()),
        _ => Err(Error::Internal {
            operation: "sign session token: secret_key is not configured".to_string(),
        }),
    }
}

/// Sign a session token for `user`, valid for `auth.security.jwt_expiry`.
pub fn create_session_token(user: &UserDBResponse, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, config);

    encode(&Header::new(ALGORITHM), &claims, &EncodingKey::from_secret(secret(config)?)).map_err(|e| Error::Internal {
        operation: format!("sign session token: {e}"),
    })
}

/// Check signature and expiry of a session token and return its claims.
///
/// Anything wrong with the token itself is a 401; key problems on our side are a 500.
pub fn verify_session_token(token: &str, config: &Config) -> Result<SessionClaims, Error> {
    let validation = Validation::new(ALGORITHM);

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret(config)?), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            if is_key_error(e.kind()) {
                Error::Internal {
                    operation: format!("verify session token: {e}"),
                }
            } else {
                Error::Unauthenticated {
                    message: Some("Invalid JWT Token".to_string()),
                }
            }
        })
}

fn is_key_error(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
            | ErrorKind::RsaFailedSigning
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::Crypto(_)
    )
}
