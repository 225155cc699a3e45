//! Error types and HTTP error codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use wishpage_store::StoreError;

/// Header carrying the machine-readable error code
pub const ERROR_CODE_HEADER: &str = "x-error-code";

/// Error codes surfaced to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InternalError,
    InvalidItem,
    InvalidPassword,
    InvalidRequest,
    InvalidToken,
    MalformedJson,
    MissingId,
    MissingToken,
    NotFound,
    ReservedOut,
    TooManyRequests,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InternalError => "InternalError",
            Self::InvalidItem => "InvalidItem",
            Self::InvalidPassword => "InvalidPassword",
            Self::InvalidRequest => "InvalidRequest",
            Self::InvalidToken => "InvalidToken",
            Self::MalformedJson => "MalformedJson",
            Self::MissingId => "MissingId",
            Self::MissingToken => "MissingToken",
            Self::NotFound => "NotFound",
            Self::ReservedOut => "ReservedOut",
            Self::TooManyRequests => "TooManyRequests",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidItem | Self::InvalidRequest | Self::MalformedJson | Self::MissingId => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidPassword | Self::InvalidToken | Self::MissingToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ReservedOut => StatusCode::CONFLICT,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Api { code: ErrorCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Create a new error with a client-facing message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Api { code, .. } => *code,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Store(e) => match e {
                StoreError::ItemNotFound(_) => ErrorCode::NotFound,
                StoreError::ReservedOut(_) | StoreError::ReservationConflict(_) => {
                    ErrorCode::ReservedOut
                }
                StoreError::Constraint(_) => ErrorCode::InvalidItem,
                StoreError::Database(_) => ErrorCode::InternalError,
            },
        }
    }

    /// Message safe to send to the client
    ///
    /// Backend details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Internal(_) | Self::Store(StoreError::Database(_)) => {
                "internal server error".to_string()
            }
            Self::Store(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let status = code.status_code();

        if status.is_server_error() {
            tracing::error!(code = code.as_str(), error = %self, "Request failed");
        } else {
            tracing::debug!(code = code.as_str(), error = %self, "Request rejected");
        }

        (
            status,
            [
                ("Content-Type", "text/plain; charset=utf-8"),
                (ERROR_CODE_HEADER, code.as_str()),
            ],
            self.public_message(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StoreError::ItemNotFound(3), StatusCode::NOT_FOUND)]
    #[case(StoreError::ReservedOut(3), StatusCode::CONFLICT)]
    #[case(StoreError::ReservationConflict(3), StatusCode::CONFLICT)]
    #[case(StoreError::Constraint("NOT NULL constraint failed: items.name".into()), StatusCode::BAD_REQUEST)]
    fn test_store_error_status(#[case] err: StoreError, #[case] status: StatusCode) {
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), status);
    }

    #[tokio::test]
    async fn test_backend_failure_is_internal() {
        let store = wishpage_store::ItemStore::open(&wishpage_store::StoreConfig::in_memory())
            .await
            .unwrap();
        store.close().await;

        let err = store.get(1).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[ERROR_CODE_HEADER],
            ErrorCode::InternalError.as_str()
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = ApiError::Internal("disk on fire".to_string());
        assert_eq!(err.public_message(), "internal server error");
    }

    #[test]
    fn test_error_code_header() {
        let response = ApiError::new(ErrorCode::MissingToken, "No token provided").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(ERROR_CODE_HEADER).unwrap(),
            "MissingToken"
        );
    }

    #[test]
    fn test_reserved_out_message() {
        let err = ApiError::from(StoreError::ReservedOut(5));
        assert_eq!(err.public_message(), "item 5 is already reserved out");
    }
}
