use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the 'admin' role:
/// catalog management and user-base oversight.
///
/// Access Control:
/// This router is wrapped in the same authentication layer as the
/// authenticated module; the `role='admin'` check then runs inside each
/// handler via `AuthUser::require_admin`, so an authenticated non-admin
/// receives 403 rather than 401.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /books
        // Adds a catalog entry. ISBN uniqueness is pre-checked in the handler.
        .route("/books", post(handlers::create_book))
        // PUT/DELETE /books/{id}
        // Updates or removes a catalog entry. Deletion cascades to the book's
        // reviews and, transitively, their comments and images.
        .route(
            "/books/{id}",
            put(handlers::update_book).delete(handlers::delete_book),
        )
        // GET /users
        // The full user base, as profiles (no credential material).
        .route("/users", get(handlers::list_users))
        // GET /reviews/count
        // Total review count across the system.
        .route("/reviews/count", get(handlers::review_count))
}
