//! Server settings loaded via OrthoConfig and the configuration object
//! consumed by [`super::create_server`].

use std::io;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use winrate::domain::ports::MatchFeed;
use winrate::domain::{
    DEFAULT_FEED_INTERVAL, DEFAULT_QUERY_TIMEOUT, GatewaySettings, MatchStore, TableVersion,
};
use winrate::outbound::cache::DEFAULT_CACHE_CAPACITY;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_WORKERS: usize = 4;
const MAX_WORKERS: usize = 10;
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Values controlling the HTTP server, layered from CLI flags, `WINRATE_*`
/// environment variables and an optional configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WINRATE")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Number of HTTP worker threads.
    pub workers: Option<usize>,
    /// Number of champions held by the recency cache.
    pub cache_capacity: Option<usize>,
    /// Seconds before a cached winrate expires; `0` disables expiry.
    pub cache_ttl_secs: Option<u64>,
    /// Allowance for one aggregation call in milliseconds.
    pub query_timeout_ms: Option<u64>,
    /// JSON-lines match store; absent keeps matches in memory only.
    pub data_path: Option<PathBuf>,
    /// Seconds between polls for rows appended to the match store; `0`
    /// stops following it.
    pub feed_interval_secs: Option<u64>,
    /// Aggregation path, `v1` or `v2`.
    pub table_version: Option<String>,
}

impl ServerSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8000`.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim().parse().map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bind address '{raw}': {err}"),
            )
        })
    }

    /// Worker count clamped to `1..=10`.
    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS).clamp(1, MAX_WORKERS)
    }

    /// Cache capacity, at least one entry.
    pub fn cache_capacity(&self) -> NonZeroUsize {
        self.cache_capacity.map_or(DEFAULT_CACHE_CAPACITY, |capacity| {
            NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
        })
    }

    /// Cache entry lifetime; zero disables expiry.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_secs
            .map_or(DEFAULT_CACHE_TTL, Duration::from_secs)
    }

    /// Aggregation allowance; zero falls back to the default.
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout_ms
            .filter(|ms| *ms > 0)
            .map_or(DEFAULT_QUERY_TIMEOUT, Duration::from_millis)
    }

    /// Table version used on cache misses, `v2` unless configured.
    pub fn table_version(&self) -> io::Result<TableVersion> {
        self.table_version.as_deref().map_or(Ok(TableVersion::V2), |raw| {
            raw.parse()
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
        })
    }

    /// Pause between match store polls; zero disables following.
    pub fn feed_interval(&self) -> Duration {
        self.feed_interval_secs
            .map_or(DEFAULT_FEED_INTERVAL, Duration::from_secs)
    }

    /// Match store location, if persistence is enabled.
    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) workers: usize,
    pub(crate) gateway: GatewaySettings,
    pub(crate) cache_capacity: NonZeroUsize,
    pub(crate) cache_ttl: Duration,
    pub(crate) store: Arc<MatchStore>,
    pub(crate) feed: Option<Arc<dyn MatchFeed>>,
    pub(crate) feed_interval: Duration,
}

impl ServerConfig {
    /// Construct a configuration with default tunables and an empty store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            workers: DEFAULT_WORKERS,
            gateway: GatewaySettings::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            store: Arc::new(MatchStore::new()),
            feed: None,
            feed_interval: DEFAULT_FEED_INTERVAL,
        }
    }

    /// Build a configuration from loaded settings.
    ///
    /// # Errors
    /// Returns [`io::ErrorKind::InvalidInput`] for an unparsable bind address
    /// or table version.
    pub fn from_settings(settings: &ServerSettings) -> io::Result<Self> {
        let mut config = Self::new(settings.bind_addr()?);
        config.workers = settings.workers();
        config.gateway = GatewaySettings {
            version: settings.table_version()?,
            query_timeout: settings.query_timeout(),
        };
        config.cache_capacity = settings.cache_capacity();
        config.cache_ttl = settings.cache_ttl();
        config.feed_interval = settings.feed_interval();
        Ok(config)
    }

    /// Serve winrates from `store`.
    #[must_use]
    pub fn with_match_store(mut self, store: Arc<MatchStore>) -> Self {
        self.store = store;
        self
    }

    /// Keep the served store in step with rows appended to `feed`.
    #[must_use]
    pub fn with_match_feed(mut self, feed: Option<Arc<dyn MatchFeed>>) -> Self {
        self.feed = feed;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server bootstrap tests")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
