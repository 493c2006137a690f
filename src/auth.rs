use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, credentials, error::ApiError};

/// The custom header carrying the raw signed session token.
/// The client sends the token directly, without a bearer prefix.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Claims
///
/// Represents the payload structure embedded inside a session token.
/// These claims are signed by the server's secret and validated upon every
/// authenticated request; they are the complete identity contract, so the
/// guard never has to consult the database.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user.
    pub sub: Uuid,
    /// The user's email at issuance time.
    pub email: String,
    /// The user's display name at issuance time.
    pub name: String,
    /// The RBAC field: 'user' or 'admin'.
    pub role: String,
    /// Issued At (iat): Timestamp when the token was issued.
    pub iat: usize,
    /// Expiration Time (exp): Timestamp after which the token must not be accepted.
    pub exp: usize,
}

/// AuthUser Extractor Result
///
/// This struct represents the resolved identity of an authenticated request.
/// Handlers use it to retrieve the user's ID and verify permissions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The unique identifier of the user, mapped to users.id.
    pub id: Uuid,
    /// The user's email, taken from the token claims.
    pub email: String,
    /// The user's display name, taken from the token claims.
    pub name: String,
    /// The user's role, 'user' or 'admin'. Used for Role-Based Access Control.
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    /// require_admin
    ///
    /// The single role-gating predicate used by every admin-restricted handler.
    /// Fails with Forbidden (403) when the requester does not hold the admin role.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "administrator role required".to_string(),
            ))
        }
    }
}

/// ensure_owner_or_admin
///
/// The owner-or-admin policy shared by review, comment, and image mutations:
/// the action is permitted if the requester created the resource or holds the
/// admin role. Callers fetch the target row first (404 if absent) and pass in
/// its owner id; for images the owner is the parent review's author.
pub fn ensure_owner_or_admin(owner_id: Uuid, user: &AuthUser) -> Result<(), ApiError> {
    if user.id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "you do not own this resource".to_string(),
        ))
    }
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. This separates authentication
/// (middleware/extractor) from business logic (the handler).
///
/// The guard is a pure gate: it reads the `x-auth-token` header and verifies the
/// signed claims. It performs no I/O — the claims carry everything downstream
/// handlers need.
///
/// Rejection: a 401 `{"error": ...}` body on a missing, malformed, or expired token.
impl<S> FromRequestParts<S> for AuthUser
where
    // S must allow sending across threads and sharing.
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the token secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // 1. Token Extraction
        // The raw signed token travels in a single custom header.
        let token = parts
            .headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Auth("missing authentication token".to_string()))?;

        // 2. Decode and Validate the Token
        let claims = credentials::verify_token(token, &config.jwt_secret)?;

        // Success: Return the resolved identity.
        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
        })
    }
}
