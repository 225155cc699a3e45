//! Server configuration

use crate::rate_limit::LoginLimits;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use wishpage_store::{StorageLocation, StoreConfig};

/// Plaintext admin password, redacted in `Debug` output
#[derive(Clone, Default)]
pub struct AdminPassword(String);

impl AdminPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminPassword(***)")
    }
}

/// Configuration problems that stop the server from starting
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing admin password")]
    MissingAdminPassword,

    #[error("invalid login limit: {0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("token lifetime must be greater than zero")]
    ZeroTokenTtl,

    #[error("limiter eviction interval must be greater than zero")]
    ZeroEvictionInterval,
}

/// Gateway server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Admin password the login hash is derived from
    pub admin_password: AdminPassword,
    /// Directory holding `items.db`; `None` keeps everything in memory
    pub database_dir: Option<PathBuf>,
    /// Reset and seed sample data on startup
    pub dev_mode: bool,
    /// Static frontend served for unmatched paths
    pub frontend_dir: Option<PathBuf>,
    /// Lifetime of issued admin tokens
    pub token_ttl: Duration,
    /// Login throttling buckets
    pub login_limits: LoginLimits,
    /// How often idle per-client buckets are evicted
    pub limiter_eviction_interval: Duration,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Enable permissive CORS
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            admin_password: AdminPassword::default(),
            database_dir: None,
            dev_mode: false,
            frontend_dir: Some(PathBuf::from("frontend")),
            token_ttl: Duration::from_secs(24 * 60 * 60), // 24 hours
            login_limits: LoginLimits::default(),
            limiter_eviction_interval: Duration::from_secs(10 * 60),
            max_body_size: 64 * 1024, // 64 KB
            cors_enabled: false,
        }
    }
}

impl ServerConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Store configuration derived from `database_dir`
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            location: StorageLocation::from_dir(self.database_dir.clone()),
        }
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_password.is_empty() {
            return Err(ConfigError::MissingAdminPassword);
        }
        if self.token_ttl.is_zero() {
            return Err(ConfigError::ZeroTokenTtl);
        }
        if self.limiter_eviction_interval.is_zero() {
            return Err(ConfigError::ZeroEvictionInterval);
        }
        self.login_limits.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ServerConfig {
        ServerConfig {
            admin_password: AdminPassword::new("hunter2"),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.store_config().location, StorageLocation::Memory);
    }

    #[test]
    fn test_missing_password_is_refused() {
        let config = ServerConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingAdminPassword)
        ));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_limits_are_refused() {
        let mut config = valid_config();
        config.login_limits.client_burst = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLimit(_))));
    }

    #[test]
    fn test_database_dir_selects_file_store() {
        let config = ServerConfig {
            database_dir: Some(PathBuf::from("/var/lib/wishpage")),
            ..valid_config()
        };
        assert_eq!(
            config.store_config().location.database_path(),
            Some(PathBuf::from("/var/lib/wishpage/items.db"))
        );
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let rendered = format!("{:?}", valid_config());
        assert!(!rendered.contains("hunter2"));
    }
}
