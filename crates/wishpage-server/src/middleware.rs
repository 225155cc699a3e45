//! HTTP middleware for authentication, rate limiting, etc.

use crate::rate_limit::{ClientIdentity, Throttled};
use crate::{ApiError, AppState, ErrorCode};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Header carrying the per-request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identity of the caller for rate limiting and logs
pub fn client_identity(request: &Request<Body>) -> ClientIdentity {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    ClientIdentity::from_request(request.headers(), peer)
}

/// Admin authentication middleware
///
/// Runs only on matched admin routes, so a wrong method is rejected first.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Err(e) = state.tokens.verify(auth_header) {
        tracing::warn!(
            client = %client_identity(&request),
            uri = %request.uri(),
            "Rejected admin request"
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Login throttling middleware
pub async fn login_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_identity(&request);

    match state.login_limiter.check(&client) {
        Ok(()) => Ok(next.run(request).await),
        Err(Throttled::Global) => {
            tracing::warn!(client = %client, "Too many login requests");
            Err(ApiError::new(ErrorCode::TooManyRequests, "Too many requests"))
        }
        Err(Throttled::Client) => {
            tracing::warn!(client = %client, "Too many login requests from client");
            Err(ApiError::new(
                ErrorCode::TooManyRequests,
                "Too many requests from this IP",
            ))
        }
    }
}

/// Request ID middleware - adds x-request-id header
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Request ID extension
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Logging middleware
///
/// Runs inside `request_id_middleware`, so the id is already attached.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client = client_identity(&request);
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        client = %client,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}
