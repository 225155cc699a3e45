//! # Wishpage Server
//!
//! HTTP gateway for the Wishpage gift registry.
//!
//! This crate provides:
//! - **Public API**: item listing and anonymous reservations
//! - **Admin API**: insert, partial update and delete behind a bearer token
//! - **Authentication**: password-hash login issuing short-lived JWTs
//! - **Rate Limiting**: global and per-client login throttling
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Browser frontend / curl                │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  Wishpage Server                    │
//! ├─────────────────────────────────────────────────────┤
//! │  Login Limiter  │  Admin Token Gate  │  Routing     │
//! ├─────────────────────────────────────────────────────┤
//! │       Handlers (items, reserve, login, admin)       │
//! ├─────────────────────────────────────────────────────┤
//! │                   wishpage-store                    │
//! │          (SQLite, single connection)                │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};
pub use server::run_server_with_shutdown;
pub use state::AppState;
