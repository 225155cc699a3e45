//! Wishpage Server - shared gift registry

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wishpage_server::config::AdminPassword;
use wishpage_server::{run_server_with_shutdown, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "wishpage-server")]
#[command(about = "Shared gift registry with reservations and an admin API")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "WISHPAGE_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "WISHPAGE_PORT")]
    port: u16,

    /// Admin password (clients log in with its SHA-256 hex digest)
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: String,

    /// Directory for items.db; in-memory storage when unset
    #[arg(long, env = "DATABASE_DIR")]
    database_dir: Option<PathBuf>,

    /// Reset the database and load sample data at startup
    #[arg(long, env = "DEV_MODE")]
    dev_mode: bool,

    /// Directory with the static frontend
    #[arg(long, default_value = "frontend", env = "WISHPAGE_FRONTEND_DIR")]
    frontend_dir: PathBuf,

    /// Admin token lifetime in hours
    #[arg(long, default_value = "24", env = "WISHPAGE_TOKEN_TTL_HOURS")]
    token_ttl_hours: u64,

    /// Enable debug logging
    #[arg(short, long, env = "WISHPAGE_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "wishpage_server={0},wishpage_store={0},tower_http={0}",
                log_level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wishpage server on {}:{}", args.host, args.port);

    if args.database_dir.is_none() {
        tracing::warn!("⚠️  No DATABASE_DIR set - data will NOT persist!");
    }

    if args.dev_mode {
        tracing::warn!("⚠️  Development mode - existing items will be replaced by sample data!");
    }

    // Build configuration
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        admin_password: AdminPassword::new(args.admin_password),
        database_dir: args.database_dir,
        dev_mode: args.dev_mode,
        frontend_dir: Some(args.frontend_dir),
        token_ttl: Duration::from_secs(args.token_ttl_hours.saturating_mul(60 * 60)),
        ..Default::default()
    };

    // Run the server until Ctrl-C
    run_server_with_shutdown(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}
