//! Application state

use crate::auth::TokenAuthority;
use crate::config::ServerConfig;
use crate::rate_limit::LoginLimiter;
use std::sync::Arc;
use tracing::{info, warn};
use wishpage_store::ItemStore;

/// Application state shared across handlers
///
/// Built once at startup and only read afterwards; the login limiter
/// synchronizes its own buckets.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Inventory store
    pub store: ItemStore,
    /// Admin password check and token signing
    pub tokens: TokenAuthority,
    /// Login throttling
    pub login_limiter: Arc<LoginLimiter>,
}

impl AppState {
    /// Open the store and build the shared state
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let store = ItemStore::open(&config.store_config()).await?;
        if store.location().is_persistent() {
            info!("✓ Storage mode: SQLite file (persistent)");
        } else {
            warn!("⚠ Storage mode: In-memory (NOT persistent - for development only)");
        }

        if config.dev_mode {
            warn!("Development mode: resetting items and loading sample data");
            store.reset_with_sample_data().await?;
        }

        Self::with_store(config, store)
    }

    /// Build state around an already opened store
    pub fn with_store(config: ServerConfig, store: ItemStore) -> anyhow::Result<Self> {
        config.validate()?;

        let tokens = TokenAuthority::new(config.admin_password.expose(), config.token_ttl);
        let login_limiter = Arc::new(LoginLimiter::new(config.login_limits)?);

        Ok(Self {
            config,
            store,
            tokens,
            login_limiter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminPassword;
    use wishpage_store::{seed::sample_items, NewItem, StoreConfig};

    fn config_in(dir: &std::path::Path, dev_mode: bool) -> ServerConfig {
        ServerConfig {
            admin_password: AdminPassword::new("hunter2"),
            database_dir: Some(dir.to_path_buf()),
            dev_mode,
            frontend_dir: None,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dev_mode_replaces_items_with_samples() {
        let dir = tempfile::tempdir().unwrap();
        let store = ItemStore::open(&StoreConfig::in_directory(dir.path()))
            .await
            .unwrap();
        store
            .insert(NewItem::new("Leftover", "Dave", "Specific Item"))
            .await
            .unwrap();
        store.close().await;

        let state = AppState::new(config_in(dir.path(), true)).await.unwrap();
        let items = state.store.list().await.into_result().unwrap();

        assert_eq!(items.len(), sample_items().len());
        assert!(items.iter().all(|item| item.name != "Leftover"));
        assert!(items.iter().any(|item| item.name == "T-Shirts size 116"));
    }

    #[tokio::test]
    async fn test_normal_mode_keeps_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = ItemStore::open(&StoreConfig::in_directory(dir.path()))
            .await
            .unwrap();
        store
            .insert(NewItem::new("Leftover", "Dave", "Specific Item"))
            .await
            .unwrap();
        store.close().await;

        let state = AppState::new(config_in(dir.path(), false)).await.unwrap();
        let items = state.store.list().await.into_result().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Leftover");
    }
}
