//! Server startup and lifecycle

use crate::rate_limit::spawn_eviction;
use crate::{routes, AppState, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the server until `shutdown_signal` resolves
pub async fn run_server_with_shutdown(
    config: ServerConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    // Create application state
    let state = Arc::new(AppState::new(config.clone()).await?);

    // Keep the per-client login buckets from growing without bound
    let eviction = spawn_eviction(
        Arc::clone(&state.login_limiter),
        config.limiter_eviction_interval,
    );

    // Create router
    let app = routes::create_router(Arc::clone(&state));

    // Bind to address
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 Wishpage server listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    eviction.abort();
    state.store.close().await;
    info!("👋 Server shutdown complete");

    Ok(())
}
