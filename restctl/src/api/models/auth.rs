//! API request/response models for token issuing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials for `/v1/auth/get_token`. `username` may also be the user's email address.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GetTokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
