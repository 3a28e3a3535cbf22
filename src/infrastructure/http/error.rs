//! HTTP Error Handling
//!
//! 业务错误统一以 HTTP 200 + `errno` 返回

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const PLAYBACK_FAILED: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const NOT_CONFIGURED: i32 = 501;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
    pub const TIMEOUT: i32 = 504;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    PlaybackFailed(String),
    Internal(String),
    NotConfigured(String),
    ServiceUnavailable(String),
    Timeout(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::PlaybackFailed(_) => errno::PLAYBACK_FAILED,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::NotConfigured(_) => errno::NOT_CONFIGURED,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
            ApiError::Timeout(_) => errno::TIMEOUT,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::PlaybackFailed(msg)
            | ApiError::Internal(msg)
            | ApiError::NotConfigured(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Timeout(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message();

        match &self {
            ApiError::Internal(_) | ApiError::ServiceUnavailable(_) => {
                tracing::error!(errno, error = %msg, "Request failed");
            }
            _ => {
                tracing::warn!(errno, error = %msg, "Request rejected");
            }
        }

        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::ConfigurationError(msg) => ApiError::NotConfigured(msg),
            ApplicationError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::PlaybackError(msg) => ApiError::PlaybackFailed(msg),
            ApplicationError::Timeout(msg) => ApiError::Timeout(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::validation("empty text"), errno::BAD_REQUEST),
            (
                ApplicationError::ConfigurationError("no key".to_string()),
                errno::NOT_CONFIGURED,
            ),
            (
                ApplicationError::Unavailable("audio unavailable".to_string()),
                errno::SERVICE_UNAVAILABLE,
            ),
            (
                ApplicationError::PlaybackError("decode".to_string()),
                errno::PLAYBACK_FAILED,
            ),
            (ApplicationError::Timeout("load".to_string()), errno::TIMEOUT),
            (ApplicationError::not_found("Sound", "boom"), errno::NOT_FOUND),
            (ApplicationError::internal("oops"), errno::INTERNAL_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).errno(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_uses_envelope() {
        let response = ApiError::BadRequest("Text cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["errno"], 400);
        assert_eq!(json["error"], "Text cannot be empty");
        assert!(json["data"].is_null());
    }
}
