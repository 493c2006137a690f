use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{auth::Claims, error::ApiError, models::User};

/// Session tokens are valid for 24 hours from issuance.
pub const TOKEN_TTL_SECS: usize = 60 * 60 * 24;

/// hash_password
///
/// Produces a salted bcrypt digest of the given plaintext. Each call generates
/// a fresh random salt, so two hashes of the same password never match.
/// Fails only if the underlying primitive fails, which surfaces as a 500.
pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// verify_password
///
/// Checks a plaintext candidate against a stored digest (constant-time via
/// bcrypt). Returns false on mismatch or on an unparseable digest; it never
/// raises an error, so the caller can map any `false` to the same 401
/// regardless of cause.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

/// issue_token
///
/// Signs a session token embedding the user's identity claims (id, email,
/// name, role) with the server-held secret. The expiry is 24 hours from
/// issuance; a token outliving that window is rejected by `verify_token`.
pub fn issue_token(user: &User, secret: &str) -> Result<String, ApiError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ApiError::Internal(format!("system clock error: {e}")))?
        .as_secs() as usize;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// verify_token
///
/// Decodes and validates a session token. Fails with an Auth error (401) if
/// the signature does not match, the token is malformed, or it has expired.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();

    // Ensure expiration time validation is always active.
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Auth("invalid or expired token".to_string()))
}
