use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::{AppError, CorpusError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),

    #[error("Unprocessable content: {0}")]
    Unprocessable(String),
}

impl From<CorpusError> for ApiError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::DuplicateContent(_) => Self::ValidationError(err.to_string()),
            CorpusError::NoFilesStored => Self::NotFound(err.to_string()),
            CorpusError::FileNotFound(_) => {
                tracing::error!("Stored reference no longer resolves: {:?}", err);
                Self::NotFound(err.to_string())
            }
            CorpusError::EmptyContent(_) => Self::Unprocessable(err.to_string()),
            CorpusError::Decoding(_) => Self::UnsupportedContent(err.to_string()),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Corpus(corpus) => Self::from(corpus),
            AppError::Validation(msg) => Self::ValidationError(msg),
            AppError::Database(_) | AppError::Storage(_) => {
                tracing::error!("Internal error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
            _ => {
                tracing::error!("Unhandled error: {:?}", err);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InternalError(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
            Self::ValidationError(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::UnsupportedContent(message) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, message),
            Self::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };

        let error_response = ErrorResponse {
            error: message,
            status: "error".to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;

    // Helper to check status code
    fn assert_status_code<T: IntoResponse + Debug>(response: T, expected_status: StatusCode) {
        let response = response.into_response();
        assert_eq!(response.status(), expected_status);
    }

    #[test]
    fn test_corpus_error_conversion() {
        let duplicate = AppError::from(CorpusError::DuplicateContent("abc".to_string()));
        let api_error = ApiError::from(duplicate);
        assert!(
            matches!(&api_error, ApiError::ValidationError(msg) if msg.contains("Duplicate file detected"))
        );
        assert_status_code(api_error, StatusCode::BAD_REQUEST);

        let api_error = ApiError::from(AppError::from(CorpusError::NoFilesStored));
        assert_status_code(api_error, StatusCode::NOT_FOUND);

        let api_error = ApiError::from(AppError::from(CorpusError::FileNotFound("x".into())));
        assert_status_code(api_error, StatusCode::NOT_FOUND);

        let api_error = ApiError::from(AppError::from(CorpusError::EmptyContent("e.txt".into())));
        assert_status_code(api_error, StatusCode::UNPROCESSABLE_ENTITY);

        let invalid = std::str::from_utf8(&[0xff]).expect_err("invalid utf-8");
        let api_error = ApiError::from(AppError::from(CorpusError::Decoding(invalid)));
        assert_status_code(api_error, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn test_validation_and_internal_conversion() {
        let validation = AppError::Validation("invalid input".to_string());
        let api_error = ApiError::from(validation);
        assert!(matches!(api_error, ApiError::ValidationError(msg) if msg == "invalid input"));

        let internal_error = AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, "io error"));
        let api_error = ApiError::from(internal_error);
        assert!(matches!(api_error, ApiError::InternalError(_)));
    }

    #[test]
    fn test_internal_error_sanitization() {
        let api_error = ApiError::InternalError("db password incorrect".to_string());

        assert_eq!(api_error.to_string(), "Internal server error");
        assert_status_code(api_error, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
