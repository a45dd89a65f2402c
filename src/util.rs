//! Shared utility functions for the Storefront application.

use axum::http::HeaderMap;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Generate an external order reference: `ORD-<millis>-<nnn>`.
pub fn generate_order_ref() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("ORD-{}-{:03}", millis, suffix)
}

/// Generate a random hex salt for password hashing.
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// Hash a password with a per-user salt under a domain prefix.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"storefront-password-v1:");
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison of a candidate password against a stored hash.
pub fn verify_password(salt: &str, password: &str, stored_hash: &str) -> bool {
    let candidate = hash_password(salt, password);
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}
