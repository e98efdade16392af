//! Builders for the match store, its follower and the HTTP state wired
//! from them.

use std::io;
use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use winrate::domain::ports::{
    MatchFeed, NoOpMatchRepository, QueryLatencyMetrics, WinrateCache, WinrateLookup,
};
use winrate::domain::{
    FeedFollower, GatewayPorts, IngestionService, MatchStore, WinrateGateway,
    WinrateQueryService,
};
use winrate::inbound::http::state::HttpState;
use winrate::outbound::cache::LruWinrateCache;
use winrate::outbound::persistence::JsonlMatchRepository;

use super::ServerConfig;

/// Served store plus the feed that keeps it in step with its file.
pub(crate) struct LoadedStore {
    pub(crate) store: Arc<MatchStore>,
    pub(crate) feed: Option<Arc<dyn MatchFeed>>,
}

/// Load the wide table from `data_path` and derive its first snapshot.
///
/// Without a path the store starts empty and nothing is followed. The
/// initial rows are read through the returned feed, so later polls pick up
/// exactly the rows appended after loading. Duplicate ids found in the file
/// are skipped with a warning.
///
/// # Errors
/// Propagates I/O and decode failures from the repository.
pub(crate) async fn load_match_store(data_path: Option<&Path>) -> io::Result<LoadedStore> {
    let Some(path) = data_path else {
        info!("no match store configured, starting empty");
        return Ok(LoadedStore {
            store: Arc::new(MatchStore::new()),
            feed: None,
        });
    };
    let feed = JsonlMatchRepository::open(path)?.feed();
    let records = feed
        .next_batch()
        .await
        .map_err(|err| io::Error::other(format!("failed to load match store: {err}")))?;
    let (store, duplicates) = MatchStore::from_records(records);
    if duplicates > 0 {
        warn!(path = %path.display(), duplicates, "duplicate match ids skipped while loading");
    }
    info!(path = %path.display(), matches = store.len(), "match store loaded");
    Ok(LoadedStore {
        store: Arc::new(store),
        feed: Some(Arc::new(feed)),
    })
}

/// Recency cache shared by the gateway and the feed follower.
pub(crate) fn build_cache(config: &ServerConfig) -> Arc<dyn WinrateCache> {
    Arc::new(LruWinrateCache::new(config.cache_capacity).with_ttl(config.cache_ttl))
}

/// Follower landing appended rows in the served store, or `None` when no
/// feed is configured or following is disabled.
///
/// Rows come back from the store file, so they are ingested without being
/// written again.
pub(crate) fn build_feed_follower(
    config: &ServerConfig,
    cache: Arc<dyn WinrateCache>,
) -> Option<FeedFollower> {
    if config.feed_interval.is_zero() {
        return None;
    }
    let feed = config.feed.clone()?;
    let ingestion = IngestionService::new(Arc::clone(&config.store), Arc::new(NoOpMatchRepository))
        .with_cache(cache);
    Some(FeedFollower::new(feed, ingestion))
}

/// Assemble the gateway over the configured store and wrap it for handlers.
pub(crate) fn build_http_state(
    config: &ServerConfig,
    cache: Arc<dyn WinrateCache>,
    metrics: Arc<dyn QueryLatencyMetrics>,
) -> web::Data<HttpState> {
    let gateway = WinrateGateway::new(
        GatewayPorts {
            query: Arc::new(WinrateQueryService::new(Arc::clone(&config.store))),
            cache,
            metrics,
        },
        config.gateway,
    );
    let lookup: Arc<dyn WinrateLookup> = Arc::new(gateway);
    web::Data::new(HttpState::new(lookup))
}
