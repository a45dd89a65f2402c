//! HS256 auth tokens for the API.
//!
//! Tokens carry the user id as the JWT subject plus the custom claims
//! below; authorization middleware checks the embedded role strings.

use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenClaims {
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

/// Issue a token for `user_id` valid for `ttl_hours`.
pub fn issue_token(
    key: &HS256Key,
    user_id: &str,
    claims: AuthTokenClaims,
    ttl_hours: u64,
) -> Result<String> {
    let claims =
        Claims::with_custom_claims(claims, Duration::from_hours(ttl_hours)).with_subject(user_id);
    key.authenticate(claims)
        .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
}

/// Verify a token and return its claims. Any failure (bad signature,
/// expired, malformed) maps to 401.
pub fn verify_token(key: &HS256Key, token: &str) -> Result<JWTClaims<AuthTokenClaims>> {
    key.verify_token::<AuthTokenClaims>(token, None)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}
