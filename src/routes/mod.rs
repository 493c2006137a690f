/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// This structure ensures that access control is applied explicitly at the
/// module level (via Axum layers), preventing accidental exposure of protected
/// endpoints.
///
/// The three modules map directly to the defined access tiers.

/// Routes accessible to all users (anonymous, read-only, plus the identity gateway).
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated session token.
pub mod authenticated;

/// Routes restricted exclusively to users with the 'admin' role.
/// The role check itself runs inside each handler via `require_admin`.
pub mod admin;
