//! HTTP Error Handling

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
    pub const CONFLICT: i32 = 409;
    pub const UNPROCESSABLE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    Conflict(String),
    /// 请求合法但无法执行（空分组、维度不一致）
    Unprocessable(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::Unprocessable(_) => errno::UNPROCESSABLE,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Internal(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message();

        match &self {
            ApiError::Internal(_) | ApiError::ServiceUnavailable(_) => {
                tracing::error!(errno = errno, error = %msg, "Request failed");
            }
            _ => {
                tracing::warn!(errno = errno, error = %msg, "Request rejected");
            }
        }

        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let msg = e.to_string();
        match e {
            ApplicationError::NotFound { .. } => ApiError::NotFound(msg),
            ApplicationError::ValidationError(_) | ApplicationError::QueryError(_) => {
                ApiError::BadRequest(msg)
            }
            ApplicationError::DuplicateName(_) => ApiError::Conflict(msg),
            ApplicationError::EmptyGroup { .. } | ApplicationError::DimensionMismatch(_) => {
                ApiError::Unprocessable(msg)
            }
            ApplicationError::SynthesisError { .. } => ApiError::ServiceUnavailable(msg),
            ApplicationError::RepositoryError(_)
            | ApplicationError::StorageError(_)
            | ApplicationError::InternalError(_) => ApiError::Internal(msg),
        }
    }
}
