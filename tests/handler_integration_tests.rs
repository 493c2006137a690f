use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use book_portal::{
    AppState, ApiError,
    auth::AuthUser,
    config::AppConfig,
    handlers,
    models::{
        Book, BookDetailResponse, Comment, CreateBookRequest, CreateCommentRequest,
        CreateImageRequest, CreateReviewRequest, Image, ImageWithOwner, RegisterRequest, Review,
        ReviewWithAuthor, UpdateBookRequest, UpdateReviewRequest, User,
    },
    repository::Repository,
};
use std::collections::HashMap;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::sync::Arc;
use tokio::test;
use uuid::Uuid;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// This struct is the central control point for testing handler logic.
// Handlers rely on the Repository trait, so we mock the trait implementation
// with pre-canned outputs, and record insert/update calls so tests can assert
// that a rejected request never reached the store.
pub struct MockRepoControl {
    // Pre-canned outputs for handler requests
    pub user_by_email: Option<User>,
    pub user_by_id: Option<User>,
    pub users_to_return: Vec<User>,
    pub book_to_return: Option<Book>,
    pub book_by_isbn: Option<Book>,
    pub review_to_return: Option<Review>,
    pub existing_review: Option<Review>,
    pub reviews_to_return: Vec<ReviewWithAuthor>,
    pub images_by_review: HashMap<Uuid, Vec<Image>>,
    pub comment_to_return: Option<Comment>,
    pub image_to_return: Option<ImageWithOwner>,
    pub review_total: i64,
    pub delete_result: bool,

    // Call recording, used to verify that a failed validation short-circuits
    // before any store write.
    pub create_review_called: AtomicBool,
    pub update_review_called: AtomicBool,
    pub delete_review_called: AtomicBool,
    pub created_user: Mutex<Option<(String, String, String, String)>>,
}

impl Default for MockRepoControl {
    fn default() -> Self {
        MockRepoControl {
            user_by_email: None,
            user_by_id: None,
            users_to_return: vec![],
            book_to_return: Some(Book::default()),
            book_by_isbn: None,
            review_to_return: Some(Review::default()),
            existing_review: None,
            reviews_to_return: vec![],
            images_by_review: HashMap::new(),
            comment_to_return: Some(Comment::default()),
            image_to_return: Some(ImageWithOwner::default()),
            review_total: 0,
            delete_result: true,
            create_review_called: AtomicBool::new(false),
            update_review_called: AtomicBool::new(false),
            delete_review_called: AtomicBool::new(false),
            created_user: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    // --- Users ---
    async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: String,
    ) -> Result<User, sqlx::Error> {
        *self.created_user.lock().unwrap() =
            Some((name.clone(), email.clone(), password_hash.clone(), role.clone()));
        Ok(User {
            id: TEST_CREATED_ID,
            name,
            email,
            password_hash,
            role,
            ..User::default()
        })
    }
    async fn get_user(&self, _id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_by_id.clone())
    }
    async fn get_user_by_email(&self, _email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_by_email.clone())
    }
    async fn update_profile(
        &self,
        _id: Uuid,
        _name: Option<String>,
        _email: Option<String>,
    ) -> Result<Option<User>, sqlx::Error> {
        Ok(self.user_by_id.clone())
    }
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        Ok(self.users_to_return.clone())
    }

    // --- Books ---
    async fn list_books(&self) -> Result<Vec<Book>, sqlx::Error> {
        Ok(self.book_to_return.clone().into_iter().collect())
    }
    async fn get_book(&self, _id: Uuid) -> Result<Option<Book>, sqlx::Error> {
        Ok(self.book_to_return.clone())
    }
    async fn get_book_by_isbn(&self, _isbn: &str) -> Result<Option<Book>, sqlx::Error> {
        Ok(self.book_by_isbn.clone())
    }
    async fn create_book(&self, req: CreateBookRequest) -> Result<Book, sqlx::Error> {
        Ok(Book {
            id: TEST_CREATED_ID,
            title: req.title,
            author: req.author,
            isbn: req.isbn,
            description: req.description,
            ..Book::default()
        })
    }
    async fn update_book(
        &self,
        _id: Uuid,
        _req: UpdateBookRequest,
    ) -> Result<Option<Book>, sqlx::Error> {
        Ok(self.book_to_return.clone())
    }
    async fn delete_book(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.delete_result)
    }

    // --- Reviews ---
    async fn get_review(&self, _id: Uuid) -> Result<Option<Review>, sqlx::Error> {
        Ok(self.review_to_return.clone())
    }
    async fn find_review(
        &self,
        _book_id: Uuid,
        _user_id: Uuid,
    ) -> Result<Option<Review>, sqlx::Error> {
        Ok(self.existing_review.clone())
    }
    async fn get_reviews_for_book(
        &self,
        _book_id: Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        Ok(self.reviews_to_return.clone())
    }
    async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i32,
        body: Option<String>,
    ) -> Result<Review, sqlx::Error> {
        self.create_review_called.store(true, Ordering::SeqCst);
        Ok(Review {
            id: TEST_CREATED_ID,
            book_id,
            user_id,
            rating,
            body,
            ..Review::default()
        })
    }
    async fn update_review(
        &self,
        _id: Uuid,
        _rating: Option<i32>,
        _body: Option<String>,
    ) -> Result<Option<Review>, sqlx::Error> {
        self.update_review_called.store(true, Ordering::SeqCst);
        Ok(self.review_to_return.clone())
    }
    async fn delete_review(&self, _id: Uuid) -> Result<bool, sqlx::Error> {
        self.delete_review_called.store(true, Ordering::SeqCst);
        Ok(self.delete_result)
    }
    async fn count_reviews(&self) -> Result<i64, sqlx::Error> {
        Ok(self.review_total)
    }

    // --- Comments ---
    async fn get_comment(&self, _id: i64) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self.comment_to_return.clone())
    }
    async fn get_comments_for_review(
        &self,
        _review_id: Uuid,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        Ok(self.comment_to_return.clone().into_iter().collect())
    }
    async fn add_comment(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<Comment, sqlx::Error> {
        Ok(Comment {
            id: 1,
            review_id,
            user_id,
            body,
            ..Comment::default()
        })
    }
    async fn delete_comment(&self, _id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.delete_result)
    }

    // --- Images ---
    async fn get_image(&self, _id: i64) -> Result<Option<ImageWithOwner>, sqlx::Error> {
        Ok(self.image_to_return.clone())
    }
    async fn get_images_for_review(&self, review_id: Uuid) -> Result<Vec<Image>, sqlx::Error> {
        Ok(self.images_by_review.get(&review_id).cloned().unwrap_or_default())
    }
    async fn add_image(
        &self,
        review_id: Uuid,
        url: String,
        name: Option<String>,
    ) -> Result<Image, sqlx::Error> {
        Ok(Image {
            id: 1,
            review_id,
            url,
            name,
            ..Image::default()
        })
    }
    async fn delete_image(&self, _id: i64) -> Result<bool, sqlx::Error> {
        Ok(self.delete_result)
    }
}

// --- TEST UTILITIES ---

const TEST_ID: Uuid = Uuid::from_u128(123);
const TEST_ADMIN_ID: Uuid = Uuid::from_u128(456);
const TEST_CREATED_ID: Uuid = Uuid::from_u128(789);

// Creates an AppState wrapping the mock repository. The Arc is shared so the
// test can inspect the mock's recorded calls after invoking the handler.
fn create_test_state(repo_control: Arc<MockRepoControl>) -> AppState {
    AppState {
        repo: repo_control,
        config: AppConfig::default(),
    }
}

// Creates AuthUser values for handler calls
fn admin_user() -> AuthUser {
    AuthUser {
        id: TEST_ADMIN_ID,
        email: "admin@example.com".to_string(),
        name: "Admin".to_string(),
        role: "admin".to_string(),
    }
}
fn regular_user() -> AuthUser {
    AuthUser {
        id: TEST_ID,
        email: "user@example.com".to_string(),
        name: "User".to_string(),
        role: "user".to_string(),
    }
}

fn review_owned_by(user_id: Uuid) -> Review {
    Review {
        id: Uuid::from_u128(7),
        book_id: Uuid::from_u128(8),
        user_id,
        rating: 3,
        ..Review::default()
    }
}

fn review_with_rating(id: u128, rating: i32) -> ReviewWithAuthor {
    ReviewWithAuthor {
        id: Uuid::from_u128(id),
        rating,
        author_name: "Someone".to_string(),
        author_email: "someone@example.com".to_string(),
        ..ReviewWithAuthor::default()
    }
}

// --- REVIEW CREATION TESTS ---

#[test]
async fn test_create_review_rejects_out_of_range_rating() {
    for rating in [0, 6, -1, 100] {
        let repo = Arc::new(MockRepoControl::default());
        let state = create_test_state(repo.clone());

        let result = handlers::create_review(
            regular_user(),
            State(state),
            Path(TEST_ID),
            Json(CreateReviewRequest { rating, body: None }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        // The store must never see an invalid rating.
        assert!(!repo.create_review_called.load(Ordering::SeqCst));
    }
}

#[test]
async fn test_create_review_rejects_missing_book() {
    let repo = Arc::new(MockRepoControl {
        book_to_return: None,
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::create_review(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(CreateReviewRequest { rating: 4, body: None }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
    assert!(!repo.create_review_called.load(Ordering::SeqCst));
}

#[test]
async fn test_create_review_rejects_duplicate() {
    let repo = Arc::new(MockRepoControl {
        existing_review: Some(review_owned_by(TEST_ID)),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::create_review(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(CreateReviewRequest { rating: 4, body: None }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Duplicate(_))));
    assert!(!repo.create_review_called.load(Ordering::SeqCst));
}

#[test]
async fn test_create_review_success() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo.clone());

    let result = handlers::create_review(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(CreateReviewRequest {
            rating: 4,
            body: Some("Great read".to_string()),
        }),
    )
    .await;

    let (status, Json(created)) = result.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.id, TEST_CREATED_ID);
    assert!(repo.create_review_called.load(Ordering::SeqCst));
}

// --- OWNERSHIP TESTS ---

#[test]
async fn test_update_review_forbidden_for_stranger() {
    // The review belongs to the admin's id; the caller is a different, non-admin user.
    let repo = Arc::new(MockRepoControl {
        review_to_return: Some(review_owned_by(TEST_ADMIN_ID)),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::update_review(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(UpdateReviewRequest {
            rating: Some(1),
            body: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
    // The rejected request must leave the review untouched.
    assert!(!repo.update_review_called.load(Ordering::SeqCst));
}

#[test]
async fn test_update_review_allowed_for_owner() {
    let repo = Arc::new(MockRepoControl {
        review_to_return: Some(review_owned_by(TEST_ID)),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::update_review(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(UpdateReviewRequest {
            rating: Some(5),
            body: None,
        }),
    )
    .await;

    assert!(result.is_ok());
    assert!(repo.update_review_called.load(Ordering::SeqCst));
}

#[test]
async fn test_delete_review_forbidden_for_stranger() {
    let repo = Arc::new(MockRepoControl {
        review_to_return: Some(review_owned_by(TEST_ADMIN_ID)),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::delete_review(regular_user(), State(state), Path(TEST_ID)).await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
    assert!(!repo.delete_review_called.load(Ordering::SeqCst));
}

#[test]
async fn test_delete_review_allows_admin_override() {
    // Owned by a regular user, deleted by an admin.
    let repo = Arc::new(MockRepoControl {
        review_to_return: Some(review_owned_by(TEST_ID)),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::delete_review(admin_user(), State(state), Path(TEST_ID)).await;

    assert!(result.is_ok());
    assert!(repo.delete_review_called.load(Ordering::SeqCst));
}

#[test]
async fn test_delete_comment_forbidden_for_stranger() {
    let repo = Arc::new(MockRepoControl {
        comment_to_return: Some(Comment {
            id: 5,
            user_id: TEST_ADMIN_ID,
            ..Comment::default()
        }),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::delete_comment(regular_user(), State(state), Path(5)).await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[test]
async fn test_delete_image_ownership_is_transitive() {
    // The image's owner is derived from its parent review's author.
    let repo = Arc::new(MockRepoControl {
        image_to_return: Some(ImageWithOwner {
            id: 9,
            owner_id: TEST_ADMIN_ID,
            ..ImageWithOwner::default()
        }),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::delete_image(regular_user(), State(state), Path(9)).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[test]
async fn test_add_image_forbidden_on_another_users_review() {
    let repo = Arc::new(MockRepoControl {
        review_to_return: Some(review_owned_by(TEST_ADMIN_ID)),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::add_image(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(CreateImageRequest {
            url: "https://example.com/cover.jpg".to_string(),
            name: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

// --- AGGREGATION TESTS ---

async fn detail_body(
    result: Result<Json<BookDetailResponse>, ApiError>,
) -> BookDetailResponse {
    let Json(body) = result.unwrap();
    body
}

#[test]
async fn test_book_detail_average_of_three_reviews() {
    let reviews = vec![
        review_with_rating(1, 5),
        review_with_rating(2, 3),
        review_with_rating(3, 4),
    ];
    let repo = Arc::new(MockRepoControl {
        reviews_to_return: reviews,
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let body = detail_body(handlers::get_book_detail(State(state), Path(TEST_ID)).await).await;

    assert_eq!(body.average_rating, 4.0);
    assert_eq!(body.total_reviews, 3);
    assert_eq!(body.reviews.len(), 3);
}

#[test]
async fn test_book_detail_zero_reviews_yields_zero_average() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo);

    let body = detail_body(handlers::get_book_detail(State(state), Path(TEST_ID)).await).await;

    // Defined as 0.0, not NaN or an error.
    assert_eq!(body.average_rating, 0.0);
    assert_eq!(body.total_reviews, 0);
}

#[test]
async fn test_book_detail_embeds_images_per_review() {
    let review = review_with_rating(1, 5);
    let mut images_by_review = HashMap::new();
    images_by_review.insert(
        review.id,
        vec![Image {
            id: 1,
            review_id: review.id,
            url: "https://example.com/one.jpg".to_string(),
            ..Image::default()
        }],
    );
    let repo = Arc::new(MockRepoControl {
        reviews_to_return: vec![review],
        images_by_review,
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let body = detail_body(handlers::get_book_detail(State(state), Path(TEST_ID)).await).await;

    assert_eq!(body.reviews[0].images.len(), 1);
    assert_eq!(body.reviews[0].images[0].url, "https://example.com/one.jpg");
}

#[test]
async fn test_book_detail_missing_book_is_not_found() {
    let repo = Arc::new(MockRepoControl {
        book_to_return: None,
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::get_book_detail(State(state), Path(TEST_ID)).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
async fn test_mean_rating_directly() {
    assert_eq!(handlers::mean_rating(&[]), 0.0);
    assert_eq!(handlers::mean_rating(&[5, 3, 4]), 4.0);
    assert_eq!(handlers::mean_rating(&[1]), 1.0);
    assert_eq!(handlers::mean_rating(&[4, 5]), 4.5);
}

// --- ADMIN GATING TESTS ---

#[test]
async fn test_create_book_forbidden_for_regular_user() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo);

    let result = handlers::create_book(
        regular_user(),
        State(state),
        Json(CreateBookRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: None,
            description: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[test]
async fn test_create_book_success_for_admin() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo);

    let result = handlers::create_book(
        admin_user(),
        State(state),
        Json(CreateBookRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: Some("9780441013593".to_string()),
            description: None,
        }),
    )
    .await;

    let (status, Json(created)) = result.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.id, TEST_CREATED_ID);
}

#[test]
async fn test_create_book_rejects_duplicate_isbn() {
    let repo = Arc::new(MockRepoControl {
        book_by_isbn: Some(Book::default()),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::create_book(
        admin_user(),
        State(state),
        Json(CreateBookRequest {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: Some("9780441013593".to_string()),
            description: None,
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Duplicate(_))));
}

#[test]
async fn test_list_users_forbidden_for_regular_user() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo);

    let result = handlers::list_users(regular_user(), State(state)).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[test]
async fn test_review_count_admin_only() {
    let repo = Arc::new(MockRepoControl {
        review_total: 17,
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::review_count(regular_user(), State(state)).await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));

    let state = create_test_state(repo);
    let Json(body) = handlers::review_count(admin_user(), State(state)).await.unwrap();
    assert_eq!(body.total_reviews, 17);
}

// --- IDENTITY TESTS ---

#[test]
async fn test_register_hashes_password_and_defaults_role() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo.clone());

    let result = handlers::register(
        State(state),
        Json(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse battery".to_string(),
        }),
    )
    .await;

    let (status, _) = result.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let recorded = repo.created_user.lock().unwrap().clone().unwrap();
    let (_, _, stored_hash, role) = recorded;
    // The plaintext never reaches the store, and the stored digest verifies.
    assert_ne!(stored_hash, "correct horse battery");
    assert!(book_portal::credentials::verify_password(
        "correct horse battery",
        &stored_hash
    ));
    assert_eq!(role, "user");
}

#[test]
async fn test_register_rejects_duplicate_email() {
    let repo = Arc::new(MockRepoControl {
        user_by_email: Some(User::default()),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo.clone());

    let result = handlers::register(
        State(state),
        Json(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse battery".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Duplicate(_))));
    assert!(repo.created_user.lock().unwrap().is_none());
}

#[test]
async fn test_register_rejects_short_password() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo.clone());

    let result = handlers::register(
        State(state),
        Json(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert!(repo.created_user.lock().unwrap().is_none());
}

#[test]
async fn test_login_issues_token_with_stored_role() {
    let digest = book_portal::credentials::hash_password("correct horse battery").unwrap();
    let repo = Arc::new(MockRepoControl {
        user_by_email: Some(User {
            id: TEST_ID,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: digest,
            role: "user".to_string(),
            ..User::default()
        }),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);
    let secret = state.config.jwt_secret.clone();

    let result = handlers::login(
        State(state),
        Json(book_portal::models::LoginRequest {
            email: "ada@example.com".to_string(),
            password: "correct horse battery".to_string(),
        }),
    )
    .await;

    let Json(body) = result.unwrap();
    assert_eq!(body.user.email, "ada@example.com");

    // The decoded claims must match the stored identity and role.
    let claims = book_portal::credentials::verify_token(&body.token, &secret).unwrap();
    assert_eq!(claims.sub, TEST_ID);
    assert_eq!(claims.role, "user");
}

#[test]
async fn test_login_rejects_wrong_password() {
    let digest = book_portal::credentials::hash_password("correct horse battery").unwrap();
    let repo = Arc::new(MockRepoControl {
        user_by_email: Some(User {
            password_hash: digest,
            ..User::default()
        }),
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::login(
        State(state),
        Json(book_portal::models::LoginRequest {
            email: "ada@example.com".to_string(),
            password: "wrong password".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Auth(_))));
}

#[test]
async fn test_login_unknown_email_same_error_as_wrong_password() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo);

    let result = handlers::login(
        State(state),
        Json(book_portal::models::LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "whatever password".to_string(),
        }),
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
}

// --- COMMENT VALIDATION ---

#[test]
async fn test_add_comment_rejects_empty_body() {
    let repo = Arc::new(MockRepoControl::default());
    let state = create_test_state(repo);

    let result = handlers::add_comment(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(CreateCommentRequest {
            body: "   ".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[test]
async fn test_add_comment_rejects_missing_review() {
    let repo = Arc::new(MockRepoControl {
        review_to_return: None,
        ..MockRepoControl::default()
    });
    let state = create_test_state(repo);

    let result = handlers::add_comment(
        regular_user(),
        State(state),
        Path(TEST_ID),
        Json(CreateCommentRequest {
            body: "Nice review".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::NotFound(_))));
}
