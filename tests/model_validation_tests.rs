use axum::{http::StatusCode, response::IntoResponse};
use book_portal::{
    ApiError,
    error::ErrorResponse,
    models::{BookDetailResponse, UpdateBookRequest, User},
};

// --- Model Serialization ---

#[test]
fn test_user_serialization_hides_password_hash() {
    let user = User {
        password_hash: "$2b$12$super-secret-digest".to_string(),
        ..User::default()
    };

    let json_output = serde_json::to_string(&user).unwrap();

    // The digest must never appear in any JSON body, under any key.
    assert!(!json_output.contains("password_hash"));
    assert!(!json_output.contains("super-secret-digest"));
}

#[test]
fn test_user_deserializes_without_password_hash() {
    // Incoming JSON (e.g. from a test fixture) may omit the digest entirely.
    let user: User = serde_json::from_str(
        r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Ada",
            "email": "ada@example.com",
            "role": "user",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#,
    )
    .unwrap();

    assert_eq!(user.password_hash, "");
    assert_eq!(user.role, "user");
}

#[test]
fn test_update_book_request_optionality() {
    // Partial updates serialize only the provided fields.
    let partial_update = UpdateBookRequest {
        title: Some("New Title Only".to_string()),
        author: None,
        isbn: None,
        description: None,
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("author")); // None fields are omitted
    assert!(!json_output.contains("isbn"));
}

#[test]
fn test_book_detail_aggregates_serialize_as_numbers() {
    let detail = BookDetailResponse {
        average_rating: 4.0,
        total_reviews: 3,
        ..BookDetailResponse::default()
    };

    let json_output = serde_json::to_string(&detail).unwrap();
    assert!(json_output.contains(r#""average_rating":4.0"#));
    assert!(json_output.contains(r#""total_reviews":3"#));
}

// --- Error Response Shape ---

async fn response_parts(err: ApiError) -> (StatusCode, ErrorResponse) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn test_error_status_mapping() {
    let cases = [
        (
            ApiError::Validation("bad input".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApiError::Duplicate("already there".to_string()),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApiError::Auth("no token".to_string()),
            StatusCode::UNAUTHORIZED,
        ),
        (
            ApiError::Forbidden("not yours".to_string()),
            StatusCode::FORBIDDEN,
        ),
        (
            ApiError::NotFound("gone".to_string()),
            StatusCode::NOT_FOUND,
        ),
    ];

    for (err, expected_status) in cases {
        let message = err.to_string();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, expected_status);
        // The taxonomy's message passes through verbatim for client errors.
        assert_eq!(body.error, message);
    }
}

#[tokio::test]
async fn test_store_error_is_generic_500() {
    let (status, body) = response_parts(ApiError::Store(sqlx::Error::PoolClosed)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Driver detail must not leak to the client.
    assert_eq!(body.error, "internal storage error");
}

#[tokio::test]
async fn test_internal_error_is_generic_500() {
    let (status, body) =
        response_parts(ApiError::Internal("clock went backwards".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error, "internal server error");
}
