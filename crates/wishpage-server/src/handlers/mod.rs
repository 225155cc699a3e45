//! Request handlers

pub mod admin;
pub mod items;
pub mod service;
pub mod session;

pub use admin::*;
pub use items::*;
pub use service::*;
pub use session::*;

use crate::{ApiError, ErrorCode};
use serde::de::DeserializeOwned;

/// Parse an item id taken from the path
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let raw = raw.trim_end_matches('/');
    if raw.is_empty() {
        return Err(ApiError::new(ErrorCode::MissingId, "Missing ID in the path"));
    }
    raw.parse()
        .map_err(|_| ApiError::new(ErrorCode::InvalidRequest, "Invalid ID in the path"))
}

/// Decode a JSON body regardless of its declared content type
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Cannot parse the request body: {}", e);
        ApiError::new(ErrorCode::MalformedJson, "cannot parse the request body")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("42/").unwrap(), 42);
        assert_eq!(
            parse_id("").unwrap_err().error_code(),
            ErrorCode::MissingId
        );
        assert_eq!(
            parse_id("abc").unwrap_err().error_code(),
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        let err = parse_json::<serde_json::Value>(b"{not json").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::MalformedJson);
    }
}
