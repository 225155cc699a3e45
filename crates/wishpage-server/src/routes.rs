//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Public endpoints
    let public = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/items", get(handlers::list_items))
        .route("/reserve/", put(handlers::missing_id))
        .route("/reserve/{id}", put(handlers::reserve_item))
        .route("/reserve/{id}/", put(handlers::reserve_item));

    // Login, throttled
    let login = Router::new()
        .route("/login", post(handlers::login))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::login_rate_limit,
        ));

    // Admin endpoints, bearer token required
    let admin = Router::new()
        .route("/admin/insert", post(handlers::insert_item))
        .route("/admin/update/", put(handlers::missing_id))
        .route("/admin/update/{id}", put(handlers::update_item))
        .route("/admin/update/{id}/", put(handlers::update_item))
        .route("/admin/delete/", delete(handlers::missing_id))
        .route("/admin/delete/{id}", delete(handlers::delete_item))
        .route("/admin/delete/{id}/", delete(handlers::delete_item))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::require_admin,
        ));

    let mut router = public.merge(login).merge(admin);

    // Static frontend for everything else
    if let Some(dir) = state.config.frontend_dir.as_ref().filter(|d| d.is_dir()) {
        tracing::info!("Serving frontend from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    let mut router = router
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.with_state(state)
}
