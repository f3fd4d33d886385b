use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use vaultgate_core::error::{AuthError, Error, RateLimitError, StorageError, ValidationError};

/// HTTP-facing error. Messages are intentionally generic: nothing here may
/// reveal whether an email exists, which credential was wrong, or any
/// internal detail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        feedback: Vec<String>,
    },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account temporarily locked")]
    Locked { remaining_seconds: i64 },

    #[error("Too many requests")]
    RateLimited { retry_after_seconds: i64 },

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Account already exists")]
    Conflict,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(ValidationError::WeakPassword { feedback, .. }) => {
                ApiError::Validation {
                    message: "Password is too weak".to_string(),
                    feedback,
                }
            }
            Error::Validation(e) => ApiError::Validation {
                message: e.to_string(),
                feedback: Vec::new(),
            },
            Error::Auth(AuthError::InvalidCredentials) => ApiError::InvalidCredentials,
            Error::Auth(AuthError::AccountLocked { remaining_seconds }) => ApiError::Locked {
                remaining_seconds,
            },
            Error::RateLimit(RateLimitError::LimitExceeded {
                retry_after_seconds,
            }) => ApiError::RateLimited {
                retry_after_seconds,
            },
            Error::Storage(StorageError::Constraint(_)) => ApiError::Conflict,
            Error::Session(_) => ApiError::Unauthorized,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { message, feedback } => {
                let mut body = json!({ "error": message, "code": 400 });
                if !feedback.is_empty() {
                    body["feedback"] = json!(feedback);
                }
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials", "code": 401 })),
            )
                .into_response(),
            ApiError::Locked { remaining_seconds } => {
                // Ceiling so a client waiting the advertised minutes is
                // always past the expiry.
                let minutes = (remaining_seconds + 59) / 60;
                (
                    StatusCode::LOCKED,
                    Json(json!({
                        "error": "Account temporarily locked due to repeated failures",
                        "code": 423,
                        "lockout_minutes_remaining": minutes,
                    })),
                )
                    .into_response()
            }
            ApiError::RateLimited {
                retry_after_seconds,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_seconds.to_string())],
                Json(json!({
                    "error": "Too many requests",
                    "code": 429,
                    "retry_after": retry_after_seconds,
                })),
            )
                .into_response(),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "Request body too large", "code": 413 })),
            )
                .into_response(),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Account already exists", "code": 409 })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized", "code": 401 })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                // Detail stays server-side.
                tracing::error!(detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error", "code": 500 })),
                )
                    .into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
