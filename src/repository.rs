use crate::models::{
    Book, Comment, CreateBookRequest, Image, ImageWithOwner, Review, ReviewWithAuthor,
    UpdateBookRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, in-memory
/// fake, etc.).
///
/// Every method takes a query template plus positional parameters; caller-supplied
/// values are never interpolated into SQL strings. Methods return
/// `Result<_, sqlx::Error>` so orchestrators can translate storage failures into
/// the user-facing error taxonomy. Uniqueness (email, isbn, one review per user
/// per book) is pre-checked by the orchestrators before insert; the database
/// constraints remain as a backstop under concurrent writes.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's async task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: String,
    ) -> Result<User, sqlx::Error>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    // Partial update of name/email. Uses COALESCE so only provided fields change.
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Option<User>, sqlx::Error>;
    // Admin access: the full user base.
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error>;

    // --- Books ---
    async fn list_books(&self) -> Result<Vec<Book>, sqlx::Error>;
    async fn get_book(&self, id: Uuid) -> Result<Option<Book>, sqlx::Error>;
    async fn get_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, sqlx::Error>;
    async fn create_book(&self, req: CreateBookRequest) -> Result<Book, sqlx::Error>;
    async fn update_book(
        &self,
        id: Uuid,
        req: UpdateBookRequest,
    ) -> Result<Option<Book>, sqlx::Error>;
    // Deleting a book cascades to its reviews, comments, and images through the
    // foreign key constraints; no application-level loop is involved.
    async fn delete_book(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Reviews ---
    async fn get_review(&self, id: Uuid) -> Result<Option<Review>, sqlx::Error>;
    // The one-review-per-user-per-book lookup used before insert.
    async fn find_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Review>, sqlx::Error>;
    // All reviews for a book, each joined with the author's identity and a
    // count of its comments.
    async fn get_reviews_for_book(
        &self,
        book_id: Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error>;
    async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i32,
        body: Option<String>,
    ) -> Result<Review, sqlx::Error>;
    async fn update_review(
        &self,
        id: Uuid,
        rating: Option<i32>,
        body: Option<String>,
    ) -> Result<Option<Review>, sqlx::Error>;
    // Deleting a review cascades to its comments and images.
    async fn delete_review(&self, id: Uuid) -> Result<bool, sqlx::Error>;
    async fn count_reviews(&self) -> Result<i64, sqlx::Error>;

    // --- Comments ---
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, sqlx::Error>;
    async fn get_comments_for_review(&self, review_id: Uuid)
    -> Result<Vec<Comment>, sqlx::Error>;
    async fn add_comment(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<Comment, sqlx::Error>;
    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Images ---
    // Joins the parent review so the caller can run the transitive ownership check.
    async fn get_image(&self, id: i64) -> Result<Option<ImageWithOwner>, sqlx::Error>;
    // Images in creation order.
    async fn get_images_for_review(&self, review_id: Uuid) -> Result<Vec<Image>, sqlx::Error>;
    async fn add_image(
        &self,
        review_id: Uuid,
        url: String,
        name: Option<String>,
    ) -> Result<Image, sqlx::Error>;
    async fn delete_image(&self, id: i64) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";
const BOOK_COLUMNS: &str = "id, title, author, isbn, description, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, book_id, user_id, rating, body, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn create_user(
        &self,
        name: String,
        email: String,
        password_hash: String,
        role: String,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// update_profile
    ///
    /// Uses the PostgreSQL `COALESCE` function to handle `Option<T>` fields,
    /// only updating a column if the corresponding argument is `Some`.
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users \
             SET name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await
    }

    // --- BOOKS ---

    async fn list_books(&self) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC");
        sqlx::query_as::<_, Book>(&query).fetch_all(&self.pool).await
    }

    async fn get_book(&self, id: Uuid) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_book(&self, req: CreateBookRequest) -> Result<Book, sqlx::Error> {
        let query = format!(
            "INSERT INTO books (id, title, author, isbn, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(Uuid::new_v4())
            .bind(req.title)
            .bind(req.author)
            .bind(req.isbn)
            .bind(req.description)
            .fetch_one(&self.pool)
            .await
    }

    /// update_book
    ///
    /// Partial update via COALESCE; returns None when the book does not exist.
    async fn update_book(
        &self,
        id: Uuid,
        req: UpdateBookRequest,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books \
             SET title = COALESCE($2, title), \
                 author = COALESCE($3, author), \
                 isbn = COALESCE($4, isbn), \
                 description = COALESCE($5, description), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(req.title)
            .bind(req.author)
            .bind(req.isbn)
            .bind(req.description)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_book(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- REVIEWS ---

    async fn get_review(&self, id: Uuid) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query =
            format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(book_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// get_reviews_for_book
    ///
    /// Joins each review with the authoring user's display name/email and a
    /// per-review comment count, newest first.
    async fn get_reviews_for_book(
        &self,
        book_id: Uuid,
    ) -> Result<Vec<ReviewWithAuthor>, sqlx::Error> {
        let query = r#"
            SELECT
                r.id, r.book_id, r.user_id, r.rating, r.body, r.created_at, r.updated_at,
                u.name AS author_name, u.email AS author_email,
                (SELECT COUNT(*) FROM review_comments c WHERE c.review_id = r.id) AS comment_count
            FROM reviews r
            JOIN users u ON r.user_id = u.id
            WHERE r.book_id = $1
            ORDER BY r.created_at DESC
        "#;
        sqlx::query_as::<_, ReviewWithAuthor>(query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn create_review(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        rating: i32,
        body: Option<String>,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (id, book_id, user_id, rating, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(Uuid::new_v4())
            .bind(book_id)
            .bind(user_id)
            .bind(rating)
            .bind(body)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_review(
        &self,
        id: Uuid,
        rating: Option<i32>,
        body: Option<String>,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews \
             SET rating = COALESCE($2, rating), \
                 body = COALESCE($3, body), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(rating)
            .bind(body)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_reviews(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await
    }

    // --- COMMENTS ---

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        let query = r#"
            SELECT c.id, c.review_id, c.user_id, c.body, c.created_at, u.email AS author_email
            FROM review_comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.id = $1
        "#;
        sqlx::query_as::<_, Comment>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_comments_for_review(
        &self,
        review_id: Uuid,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = r#"
            SELECT c.id, c.review_id, c.user_id, c.body, c.created_at, u.email AS author_email
            FROM review_comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.review_id = $1
            ORDER BY c.created_at ASC
        "#;
        sqlx::query_as::<_, Comment>(query)
            .bind(review_id)
            .fetch_all(&self.pool)
            .await
    }

    /// add_comment
    ///
    /// Inserts a new comment and immediately joins with `users` to return the
    /// enriched `Comment` model, including the author's email. Uses a CTE so the
    /// insert and the join happen in one round-trip.
    async fn add_comment(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        body: String,
    ) -> Result<Comment, sqlx::Error> {
        let query = r#"
            WITH inserted AS (
                INSERT INTO review_comments (review_id, user_id, body)
                VALUES ($1, $2, $3)
                RETURNING id, review_id, user_id, body, created_at
            )
            SELECT i.id, i.review_id, i.user_id, i.body, i.created_at, u.email AS author_email
            FROM inserted i JOIN users u ON i.user_id = u.id
        "#;
        sqlx::query_as::<_, Comment>(query)
            .bind(review_id)
            .bind(user_id)
            .bind(body)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM review_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- IMAGES ---

    /// get_image
    ///
    /// Loads an image together with its parent review's author id. Image rows do
    /// not store an owner; the join derives it for the ownership check.
    async fn get_image(&self, id: i64) -> Result<Option<ImageWithOwner>, sqlx::Error> {
        let query = r#"
            SELECT i.id, i.review_id, i.url, i.name, i.created_at, r.user_id AS owner_id
            FROM review_images i
            JOIN reviews r ON i.review_id = r.id
            WHERE i.id = $1
        "#;
        sqlx::query_as::<_, ImageWithOwner>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_images_for_review(&self, review_id: Uuid) -> Result<Vec<Image>, sqlx::Error> {
        let query = r#"
            SELECT id, review_id, url, name, created_at
            FROM review_images
            WHERE review_id = $1
            ORDER BY created_at ASC, id ASC
        "#;
        sqlx::query_as::<_, Image>(query)
            .bind(review_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn add_image(
        &self,
        review_id: Uuid,
        url: String,
        name: Option<String>,
    ) -> Result<Image, sqlx::Error> {
        let query = r#"
            INSERT INTO review_images (review_id, url, name)
            VALUES ($1, $2, $3)
            RETURNING id, review_id, url, name, created_at
        "#;
        sqlx::query_as::<_, Image>(query)
            .bind(review_id)
            .bind(url)
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    async fn delete_image(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM review_images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
