//! # Wishpage Store
//!
//! Transactional storage for the Wishpage gift registry.
//!
//! This crate provides:
//! - **Items**: the single inventory relation and its wire types
//! - **Partial updates**: patches where every field is explicitly "set" or "unchanged"
//! - **Reservations**: decrement-with-floor that cannot oversell under concurrency
//! - **Sample data**: the fixed seed set used in development mode
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Request Gateway              │
//! ├─────────────────────────────────────────┤
//! │              ItemStore                  │
//! │  list │ insert │ update │ reserve │ del │
//! ├─────────────────────────────────────────┤
//! │     SQLite (one pooled connection)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The pool never holds more than one connection, so every store call is
//! serialized at the connection. Transactions add read-then-guarded-write
//! atomicity on top of that.

pub mod error;
pub mod item;
pub mod seed;
pub mod store;

pub use error::{Result, StoreError};
pub use item::{Item, ItemPatch, NewItem, NUMBER_UNCHANGED, TEXT_UNCHANGED};
pub use store::{ItemListing, ItemStore, StorageLocation, StoreConfig};

/// File name used inside a configured storage directory
pub const DATABASE_FILE: &str = "items.db";
