use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer: profile management plus the review, comment, and
/// image lifecycles.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that
/// all handlers receive a validated `AuthUser` struct containing the user's ID
/// and role, which is then used for all owner-or-admin authorization checks
/// (e.g., in `update_review` and `delete_comment`).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/PUT /profile
        // Retrieves or partially updates the authenticated user's own record.
        // Only name and email are mutable here.
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        // --- Review Lifecycle ---
        // POST /books/{id}/reviews
        // Submits a review on a book. The handler enforces the rating range and
        // the one-review-per-user-per-book invariant before insert.
        .route("/books/{id}/reviews", post(handlers::create_review))
        // PUT/DELETE /reviews/{id}
        // Edits or removes a review under the owner-or-admin policy. Deletion
        // cascades to the review's comments and images.
        .route(
            "/reviews/{id}",
            put(handlers::update_review).delete(handlers::delete_review),
        )
        // --- Commenting ---
        // POST /reviews/{id}/comments
        // Posts a comment on a review. Any authenticated user may comment.
        .route("/reviews/{id}/comments", post(handlers::add_comment))
        // DELETE /comments/{id}
        // Removes a comment under the owner-or-admin policy.
        .route("/comments/{id}", delete(handlers::delete_comment))
        // --- Images ---
        // POST /reviews/{id}/images
        // Attaches an image to the caller's own review (or any review, for admins).
        .route("/reviews/{id}/images", post(handlers::add_image))
        // DELETE /images/{id}
        // Removes an image; ownership is derived from the parent review.
        .route("/images/{id}", delete(handlers::delete_image))
}
