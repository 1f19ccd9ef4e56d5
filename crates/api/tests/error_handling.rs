//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use tunedrop_api::error::AppError;
use tunedrop_core::error::{CoreError, PersistenceError, SubmitError, ValidationIssue};

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "session",
        id: "42".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "session with id 42 not found");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("2 upload(s) still in progress".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert!(json.get("issues").is_none());
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn invalid_submission_returns_422_with_every_issue() {
    let err = AppError::Submit(SubmitError::Invalid(vec![
        ValidationIssue::new("composition_splits", "Composition splits must total 100%"),
        ValidationIssue::new("title", "Title is required"),
    ]));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let issues = json["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0]["field"], "composition_splits");
    assert_eq!(issues[1]["message"], "Title is required");
}

#[tokio::test]
async fn duplicate_submission_returns_409() {
    let (status, json) = error_to_response(AppError::Submit(SubmitError::InProgress)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "SUBMISSION_IN_PROGRESS");
}

#[tokio::test]
async fn persistence_failure_returns_502_with_its_message() {
    let err = AppError::Submit(SubmitError::Persistence(PersistenceError(
        "duplicate key value".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "PERSISTENCE_ERROR");
    assert!(json["error"].as_str().unwrap().contains("duplicate key value"));
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
