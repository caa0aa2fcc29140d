//! API key tokens.

use rand::prelude::RngExt;
use rand::rng;

/// Length of generated API key tokens.
pub const TOKEN_LENGTH: usize = 40;

const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a new random alphanumeric API key token.
pub fn generate_token() -> String {
    let mut rng = rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_CHARSET[rng.random_range(0..TOKEN_CHARSET.len())] as char)
        .collect()
}

/// Token from an `Authorization: ApiKey <token>` header value.
pub fn parse_authorization(value: &str) -> Option<&str> {
    let token = value.strip_prefix("ApiKey ")?.trim();
    (!token.is_empty()).then_some(token)
}
