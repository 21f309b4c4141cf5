use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use services::services::{AuthError, ServiceError};
use thiserror::Error;

/// Everything a handler can fail with, rendered as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Path(#[from] PathRejection),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error("missing or invalid access token")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Service(error) => service_error_response(error),
            ApiError::Json(rejection) => {
                let status = match rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, Json(json!({ "error": rejection.body_text() }))).into_response()
            }
            ApiError::Path(rejection) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response(),
            ApiError::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response(),
        }
    }
}

fn service_error_response(error: ServiceError) -> Response {
    match error {
        ServiceError::NotFound(kind) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("{kind} not found") })),
        ),
        ServiceError::Forbidden => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "forbidden" })),
        ),
        ServiceError::Validation(details) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation failed", "details": details })),
        ),
        ServiceError::Conflict(message) => (StatusCode::CONFLICT, Json(json!({ "error": message }))),
        ServiceError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        ),
        ServiceError::Storage(err) => {
            tracing::error!(?err, "storage failure");
            internal_error()
        }
        ServiceError::Auth(AuthError::InvalidToken | AuthError::TokenExpired) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        ),
        ServiceError::Auth(err) => {
            tracing::error!(?err, "failed to issue access token");
            internal_error()
        }
        ServiceError::PasswordHash(err) => {
            tracing::error!(%err, "password hashing failed");
            internal_error()
        }
        ServiceError::Blocking(err) => {
            tracing::error!(?err, "blocking task failed");
            internal_error()
        }
    }
    .into_response()
}

fn internal_error() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
}
