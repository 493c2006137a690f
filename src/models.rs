use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The canonical identity record stored in the `users` table. This struct is
/// internal: responses expose `UserProfile` instead, and the password digest is
/// excluded from serialization so it can never leak through a JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // The user's primary identifier. Unique across the system.
    pub email: String,
    /// bcrypt digest, not exposed in JSON.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    // The RBAC field: 'user' or 'admin'. Defaults to 'user' at registration.
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book
///
/// A catalog record from the `books` table. Books are owned collectively by
/// admins; only the admin role may create, update, or delete them. Deleting a
/// book cascades to its reviews (and transitively their comments and images)
/// through the foreign key constraints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    // Unique when present; a book without an ISBN is allowed.
    pub isbn: Option<String>,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Review
///
/// A star-rated review from the `reviews` table. Belongs to exactly one book
/// and one user; at most one review exists per (user, book) pair. Owned by its
/// creating user; mutation and deletion are permitted to that user or any admin.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    /// Integer rating in [1, 5].
    pub rating: i32,
    pub body: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ReviewWithAuthor
///
/// A review row augmented with the authoring user's display name and email and
/// a count of its comments (all loaded via JOINs in the repository query).
/// This is the shape embedded in the book detail response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ReviewWithAuthor {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub body: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    pub author_email: String,
    pub comment_count: i64,
}

/// Comment
///
/// A comment record from the `review_comments` table, augmented with the
/// author's email (a join operation).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    // BigInt (i64) for comment ID due to the high volume potential.
    pub id: i64,
    pub review_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // This field is loaded via a JOIN in the repository query.
    #[sqlx(default)]
    pub author_email: Option<String>,
}

/// Image
///
/// An image attached to a review, from the `review_images` table. Carries a URL
/// and an optional display name. Ownership is not stored here: it is derived
/// transitively through the parent review's author.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Image {
    pub id: i64,
    pub review_id: Uuid,
    pub url: String,
    pub name: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ImageWithOwner
///
/// Internal read model joining an image with its parent review's author. Used
/// only by the ownership check on image mutation; never serialized.
#[derive(Debug, Clone, FromRow, Default)]
pub struct ImageWithOwner {
    pub id: i64,
    pub review_id: Uuid,
    pub url: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    /// users.id of the review's author, resolved via the reviews join.
    pub owner_id: Uuid,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// The plaintext password is hashed immediately and never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// UpdateProfileRequest
///
/// Partial update payload for PUT /profile. Only name and email are mutable;
/// role and password travel through dedicated flows.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// CreateBookRequest
///
/// Input payload for submitting a new catalog entry (POST /books, admin only).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
}

/// UpdateBookRequest
///
/// Partial update payload for modifying an existing book (PUT /books/{id}).
/// Uses `Option<T>` fields so only provided columns are touched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateBookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// CreateReviewRequest
///
/// Input payload for posting a review on a book.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateReviewRequest {
    /// Integer rating in [1, 5].
    pub rating: i32,
    pub body: Option<String>,
}

/// UpdateReviewRequest
///
/// Partial update payload for editing an existing review.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment. The body must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// CreateImageRequest
///
/// Input payload for attaching an image to a review.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateImageRequest {
    pub url: String,
    pub name: Option<String>,
}

// --- Response Schemas (Output) ---

/// UserProfile
///
/// Output schema for user-facing identity data. This is the only shape in which
/// user records leave the API; the password digest never appears here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// LoginResponse
///
/// Output schema for POST /login: the signed session token plus the profile of
/// the authenticated user, so the client can render without a second request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// ReviewDetail
///
/// A review with its attached images, as embedded in the book detail response.
/// Images are listed in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewDetail {
    pub review: ReviewWithAuthor,
    pub images: Vec<Image>,
}

/// BookDetailResponse
///
/// Output schema for GET /books/{id}: the book, its reviews (each joined with
/// author identity, comment count, and images), and the aggregate statistics
/// computed at read time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BookDetailResponse {
    pub book: Book,
    pub reviews: Vec<ReviewDetail>,
    /// Mean of the review ratings; 0.0 when the book has no reviews.
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// CreatedResponse
///
/// Output shape for creation endpoints: a human-readable message plus the new
/// row's identifier.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatedResponse {
    pub message: String,
    pub id: Uuid,
}

/// MessageResponse
///
/// Output shape for mutations that have no row to return, e.g. deletions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// ReviewCountResponse
///
/// Output schema for the admin review counter (GET /reviews/count).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReviewCountResponse {
    pub total_reviews: i64,
}
