use crate::{
    AppState,
    auth::{AuthUser, ensure_owner_or_admin},
    credentials,
    error::ApiError,
    models::{
        Book, BookDetailResponse, Comment, CreateBookRequest, CreateCommentRequest,
        CreateImageRequest, CreateReviewRequest, CreatedResponse, Image, LoginRequest,
        LoginResponse, MessageResponse, RegisterRequest, Review, ReviewCountResponse,
        ReviewDetail, UpdateBookRequest, UpdateProfileRequest, UpdateReviewRequest, UserProfile,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Validation Helpers ---

/// Minimal email shape check. Full RFC validation is a client concern; the
/// server only rejects obviously unusable values.
fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::Validation("a valid email is required".to_string()));
    }
    Ok(())
}

fn validate_rating(rating: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "rating must be an integer between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

/// mean_rating
///
/// The aggregate computed for book detail reads. Defaults to 0.0 for an empty
/// slice so a book with no reviews never divides by zero.
pub fn mean_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i32 = ratings.iter().sum();
    f64::from(sum) / ratings.len() as f64
}

// --- Identity Handlers ---

/// register
///
/// [Public Route] Creates a new account. The email must be unused (pre-checked
/// before insert, with the database unique constraint as backstop), the
/// password is hashed with Argon2id before it touches the store, and the role
/// always defaults to 'user' — there is no way to register as admin.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = CreatedResponse),
        (status = 400, description = "Invalid input or duplicate email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    validate_email(&payload.email)?;
    if payload.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    if state.repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::Duplicate("email already registered".to_string()));
    }

    let password_hash = credentials::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(payload.name, payload.email, password_hash, "user".to_string())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "User registered successfully".to_string(),
            id: user.id,
        }),
    ))
}

/// login
///
/// [Public Route] Verifies credentials and issues a signed session token whose
/// claims embed the user's id, email, name, and role, expiring 24 hours from
/// issuance. Unknown email and wrong password produce the same 401 so the
/// endpoint does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let user = state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Auth("invalid email or password".to_string()))?;

    if !credentials::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Auth("invalid email or password".to_string()));
    }

    let token = credentials::issue_token(&user, &state.config.jwt_secret)?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// get_profile
///
/// [Authenticated Route] Returns the requesting user's own profile. The row is
/// re-read from the store so a profile update is visible immediately, even
/// though the token still carries the claims from issuance time.
#[utoipa::path(
    get,
    path = "/profile",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(user.into()))
}

/// update_profile
///
/// [Authenticated Route] Partial update of the user's own name and email.
/// A changed email must still be unique across the user base.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Updated", body = UserProfile))
)]
pub async fn update_profile(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if payload.name.is_none() && payload.email.is_none() {
        return Err(ApiError::Validation("no fields to update".to_string()));
    }
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
        // Pre-check uniqueness, ignoring a hit on our own row.
        if let Some(existing) = state.repo.get_user_by_email(email).await? {
            if existing.id != id {
                return Err(ApiError::Duplicate("email already registered".to_string()));
            }
        }
    }

    let user = state
        .repo
        .update_profile(id, payload.name, payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(user.into()))
}

// --- Book Handlers ---

/// list_books
///
/// [Public Route] Lists the entire catalog, newest first.
#[utoipa::path(
    get,
    path = "/books",
    responses((status = 200, description = "All books", body = [Book]))
)]
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.repo.list_books().await?))
}

/// get_book_detail
///
/// [Public Route] The aggregated book detail view:
/// 1. the book itself (404 if absent),
/// 2. its reviews joined with author identity and per-review comment counts,
/// 3. each review's images in creation order,
/// 4. average rating (0.0 for zero reviews) and total review count.
///
/// Aggregates are computed on read rather than maintained incrementally; the
/// multi-step fetch is a sequence of independent store round-trips with no
/// transactional wrapping.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Detail with reviews and aggregates", body = BookDetailResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_book_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookDetailResponse>, ApiError> {
    let book = state
        .repo
        .get_book(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("book not found".to_string()))?;

    let reviews = state.repo.get_reviews_for_book(id).await?;

    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
    let average_rating = mean_rating(&ratings);
    let total_reviews = reviews.len() as i64;

    let mut detailed = Vec::with_capacity(reviews.len());
    for review in reviews {
        let images = state.repo.get_images_for_review(review.id).await?;
        detailed.push(ReviewDetail { review, images });
    }

    Ok(Json(BookDetailResponse {
        book,
        reviews: detailed,
        average_rating,
        total_reviews,
    }))
}

/// create_book
///
/// [Admin Route] Adds a catalog entry. The ISBN, when provided, must be unique
/// (pre-checked before insert).
#[utoipa::path(
    post,
    path = "/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Created", body = CreatedResponse),
        (status = 403, description = "Not Admin")
    )
)]
pub async fn create_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    auth.require_admin()?;

    if payload.title.trim().is_empty() || payload.author.trim().is_empty() {
        return Err(ApiError::Validation(
            "title and author are required".to_string(),
        ));
    }
    if let Some(isbn) = &payload.isbn {
        if state.repo.get_book_by_isbn(isbn).await?.is_some() {
            return Err(ApiError::Duplicate(
                "a book with this isbn already exists".to_string(),
            ));
        }
    }

    let book = state.repo.create_book(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Book created successfully".to_string(),
            id: book.id,
        }),
    ))
}

/// update_book
///
/// [Admin Route] Partial update of a catalog entry. A changed ISBN must not
/// collide with another book's.
#[utoipa::path(
    put,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated", body = Book),
        (status = 403, description = "Not Admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<Book>, ApiError> {
    auth.require_admin()?;

    if let Some(isbn) = &payload.isbn {
        if let Some(existing) = state.repo.get_book_by_isbn(isbn).await? {
            if existing.id != id {
                return Err(ApiError::Duplicate(
                    "a book with this isbn already exists".to_string(),
                ));
            }
        }
    }

    let book = state
        .repo
        .update_book(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("book not found".to_string()))?;
    Ok(Json(book))
}

/// delete_book
///
/// [Admin Route] Removes a book. The store's cascade constraints delete all of
/// its reviews and, transitively, their comments and images.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.require_admin()?;

    if !state.repo.delete_book(id).await? {
        return Err(ApiError::NotFound("book not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

// --- Review Handlers ---

/// create_review
///
/// [Authenticated Route] Posts a review on a book. The sequence is fixed:
/// rating range check, book existence check, then the one-review-per-user-
/// per-book check before insert. The reviews table's unique (book_id, user_id)
/// constraint backstops the pre-check under concurrent writes.
#[utoipa::path(
    post,
    path = "/books/{id}/reviews",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Created", body = CreatedResponse),
        (status = 400, description = "Bad rating or duplicate review"),
        (status = 404, description = "Book Not Found")
    )
)]
pub async fn create_review(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    validate_rating(payload.rating)?;

    if state.repo.get_book(book_id).await?.is_none() {
        return Err(ApiError::NotFound("book not found".to_string()));
    }
    if state.repo.find_review(book_id, user_id).await?.is_some() {
        return Err(ApiError::Duplicate(
            "you have already reviewed this book".to_string(),
        ));
    }

    let review = state
        .repo
        .create_review(book_id, user_id, payload.rating, payload.body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Review created successfully".to_string(),
            id: review.id,
        }),
    ))
}

/// update_review
///
/// [Authenticated Route] Edits a review. The target is fetched first (404 if
/// absent) and then gated by the owner-or-admin policy.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated", body = Review),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    let existing = state
        .repo
        .get_review(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;
    ensure_owner_or_admin(existing.user_id, &auth)?;

    if let Some(rating) = payload.rating {
        validate_rating(rating)?;
    }

    let review = state
        .repo
        .update_review(id, payload.rating, payload.body)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;
    Ok(Json(review))
}

/// delete_review
///
/// [Authenticated Route] Deletes a review under the owner-or-admin policy.
/// Cascades to the review's comments and images through the store constraints.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state
        .repo
        .get_review(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;
    ensure_owner_or_admin(existing.user_id, &auth)?;

    if !state.repo.delete_review(id).await? {
        return Err(ApiError::NotFound("review not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}

/// review_count
///
/// [Admin Route] Total number of reviews across the system.
#[utoipa::path(
    get,
    path = "/reviews/count",
    responses(
        (status = 200, description = "Count", body = ReviewCountResponse),
        (status = 403, description = "Not Admin")
    )
)]
pub async fn review_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ReviewCountResponse>, ApiError> {
    auth.require_admin()?;
    let total_reviews = state.repo.count_reviews().await?;
    Ok(Json(ReviewCountResponse { total_reviews }))
}

// --- Comment Handlers ---

/// add_comment
///
/// [Authenticated Route] Posts a comment on a review. The body must be
/// non-empty and the parent review must exist. Any authenticated user may
/// comment; ownership only matters for deletion.
#[utoipa::path(
    post,
    path = "/reviews/{id}/comments",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment Added", body = Comment),
        (status = 404, description = "Review Not Found")
    )
)]
pub async fn add_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    if payload.body.trim().is_empty() {
        return Err(ApiError::Validation(
            "comment body must not be empty".to_string(),
        ));
    }
    if state.repo.get_review(review_id).await?.is_none() {
        return Err(ApiError::NotFound("review not found".to_string()));
    }

    let comment = state
        .repo
        .add_comment(review_id, user_id, payload.body)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// get_comments
///
/// [Public Route] Lists a review's comments in posting order, each enriched
/// with the author's email.
#[utoipa::path(
    get,
    path = "/reviews/{id}/comments",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Comments", body = [Comment]),
        (status = 404, description = "Review Not Found")
    )
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    if state.repo.get_review(review_id).await?.is_none() {
        return Err(ApiError::NotFound("review not found".to_string()));
    }
    Ok(Json(state.repo.get_comments_for_review(review_id).await?))
}

/// delete_comment
///
/// [Authenticated Route] Deletes a comment under the owner-or-admin policy.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let comment = state
        .repo
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))?;
    ensure_owner_or_admin(comment.user_id, &auth)?;

    if !state.repo.delete_comment(id).await? {
        return Err(ApiError::NotFound("comment not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Comment deleted successfully".to_string(),
    }))
}

// --- Image Handlers ---

/// add_image
///
/// [Authenticated Route] Attaches an image to a review. An image belongs to the
/// review it decorates, so attachment is gated by the parent review's
/// owner-or-admin policy, just like removal.
#[utoipa::path(
    post,
    path = "/reviews/{id}/images",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = CreateImageRequest,
    responses(
        (status = 201, description = "Image Attached", body = Image),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Review Not Found")
    )
)]
pub async fn add_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<CreateImageRequest>,
) -> Result<(StatusCode, Json<Image>), ApiError> {
    if payload.url.trim().is_empty() {
        return Err(ApiError::Validation(
            "image url must not be empty".to_string(),
        ));
    }
    let review = state
        .repo
        .get_review(review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;
    ensure_owner_or_admin(review.user_id, &auth)?;

    let image = state
        .repo
        .add_image(review_id, payload.url, payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// get_images
///
/// [Public Route] Lists a review's images in creation order.
#[utoipa::path(
    get,
    path = "/reviews/{id}/images",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Images", body = [Image]),
        (status = 404, description = "Review Not Found")
    )
)]
pub async fn get_images(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<Vec<Image>>, ApiError> {
    if state.repo.get_review(review_id).await?.is_none() {
        return Err(ApiError::NotFound("review not found".to_string()));
    }
    Ok(Json(state.repo.get_images_for_review(review_id).await?))
}

/// delete_image
///
/// [Authenticated Route] Removes an image. Image rows carry no owner column;
/// the policy input is the parent review's author, resolved by the repository
/// join.
#[utoipa::path(
    delete,
    path = "/images/{id}",
    params(("id" = i64, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_image(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let image = state
        .repo
        .get_image(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("image not found".to_string()))?;
    ensure_owner_or_admin(image.owner_id, &auth)?;

    if !state.repo.delete_image(id).await? {
        return Err(ApiError::NotFound("image not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Image deleted successfully".to_string(),
    }))
}

// --- Admin Handlers ---

/// list_users
///
/// [Admin Route] The full user base, as profiles. The password digest never
/// leaves the repository layer.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [UserProfile]),
        (status = 403, description = "Not Admin")
    )
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    auth.require_admin()?;
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}
