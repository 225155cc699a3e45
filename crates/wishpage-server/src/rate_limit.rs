//! Login admission control
//!
//! Two independent token buckets guard `/login`: one shared by every client
//! and one per client identity. Either bucket running dry rejects the request.

use crate::config::ConfigError;
use axum::http::HeaderMap;
use governor::{
    clock::DefaultClock,
    state::{keyed::DefaultKeyedStateStore, InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::fmt;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Header set by a trusted reverse proxy
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Rate limiter shared by all clients
pub type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter with one bucket per client
pub type KeyedRateLimiter =
    RateLimiter<ClientIdentity, DefaultKeyedStateStore<ClientIdentity>, DefaultClock>;

/// Bucket key derived from the request; never persisted
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// First `X-Forwarded-For` entry if present, else the peer address
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        match (forwarded, peer) {
            (Some(ip), _) => Self::new(ip),
            (None, Some(addr)) => Self::new(addr.ip().to_string()),
            (None, None) => Self::new("unknown"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bucket sizes and refill rates for login attempts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoginLimits {
    /// Capacity of the shared bucket
    pub global_burst: u32,
    /// Shared bucket refill, tokens per second
    pub global_per_second: u32,
    /// Capacity of each client bucket
    pub client_burst: u32,
    /// Client bucket refill, tokens per minute
    pub client_per_minute: u32,
}

impl Default for LoginLimits {
    fn default() -> Self {
        Self {
            global_burst: 3,
            global_per_second: 1,
            client_burst: 10,
            client_per_minute: 1,
        }
    }
}

impl LoginLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quotas().map(|_| ())
    }

    fn quotas(&self) -> Result<(Quota, Quota), ConfigError> {
        let global = Quota::per_second(non_zero(self.global_per_second, "global_per_second")?)
            .allow_burst(non_zero(self.global_burst, "global_burst")?);
        let client = Quota::per_minute(non_zero(self.client_per_minute, "client_per_minute")?)
            .allow_burst(non_zero(self.client_burst, "client_burst")?);
        Ok((global, client))
    }
}

fn non_zero(value: u32, name: &'static str) -> Result<NonZeroU32, ConfigError> {
    NonZeroU32::new(value).ok_or(ConfigError::ZeroLimit(name))
}

/// Which bucket refused the request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Throttled {
    /// Too many logins across all clients
    Global,
    /// Too many logins from this client
    Client,
}

/// Global plus per-client login limiter
pub struct LoginLimiter {
    global: DirectRateLimiter,
    per_client: KeyedRateLimiter,
}

impl LoginLimiter {
    /// Create a limiter with fresh buckets
    pub fn new(limits: LoginLimits) -> Result<Self, ConfigError> {
        let (global, client) = limits.quotas()?;
        Ok(Self {
            global: RateLimiter::direct(global),
            per_client: RateLimiter::keyed(client),
        })
    }

    /// Consume one token from each bucket, never waiting
    ///
    /// The shared bucket is checked first; a client bucket is created the
    /// first time its identity is seen.
    pub fn check(&self, client: &ClientIdentity) -> Result<(), Throttled> {
        if self.global.check().is_err() {
            return Err(Throttled::Global);
        }
        if self.per_client.check_key(client).is_err() {
            return Err(Throttled::Client);
        }
        Ok(())
    }

    /// Number of client buckets currently held
    pub fn tracked_clients(&self) -> usize {
        self.per_client.len()
    }

    /// Drop client buckets that have refilled completely
    ///
    /// A full bucket is indistinguishable from a new one, so forgetting it
    /// changes no admission decision.
    pub fn evict_idle(&self) {
        let before = self.per_client.len();
        self.per_client.retain_recent();
        self.per_client.shrink_to_fit();
        let evicted = before.saturating_sub(self.per_client.len());
        if evicted > 0 {
            debug!(evicted, remaining = self.per_client.len(), "Evicted idle login buckets");
        }
    }
}

/// Periodically evict idle client buckets
pub fn spawn_eviction(
    limiter: Arc<LoginLimiter>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.evict_idle();
        }
    })
}
