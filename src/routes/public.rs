use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the identity gateway (register/login) and the
/// read-only catalog surface. Book detail, comments, and images are world-
/// readable; writes on those resources live in the authenticated module.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // New account creation. Role always defaults to 'user'.
        .route("/register", post(handlers::register))
        // POST /login
        // Credential verification; issues the session token carried by all
        // protected requests in the x-auth-token header.
        .route("/login", post(handlers::login))
        // GET /books
        // Lists the entire catalog.
        .route("/books", get(handlers::list_books))
        // GET /books/{id}
        // The aggregated detail view: book, reviews with authors/images/comment
        // counts, average rating, and total review count.
        .route("/books/{id}", get(handlers::get_book_detail))
        // GET /reviews/{id}/comments
        // Lists all comments on a review.
        .route("/reviews/{id}/comments", get(handlers::get_comments))
        // GET /reviews/{id}/images
        // Lists a review's images in creation order.
        .route("/reviews/{id}/images", get(handlers::get_images))
}
