//! Shared helpers for winrate integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! match builders and the wiring of the gateway live here instead of being
//! copied into every file.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use winrate::domain::ports::{
    NoOpQueryLatencyMetrics, WinrateCache, WinrateQuery, WinrateQueryError,
};
use winrate::domain::{
    ChampionId, GatewayPorts, GatewaySettings, Lineup, MatchId, MatchRecordWide, MatchStore,
    TableVersion, Winrate, WinrateGateway, WinrateQueryService,
};
use winrate::outbound::cache::LruWinrateCache;

pub fn lineup(names: [&str; 5]) -> Lineup {
    let [top, jungle, middle, bottom, utility] =
        names.map(|name| ChampionId::new(name).expect("valid champion"));
    Lineup::new(top, jungle, middle, bottom, utility)
}

pub fn wide(match_id: &str, blue: [&str; 5], red: [&str; 5], blue_win: bool) -> MatchRecordWide {
    MatchRecordWide::new(
        MatchId::new(match_id).expect("valid match id"),
        lineup(blue),
        lineup(red),
        blue_win,
    )
    .expect("distinct champions")
}

/// Ahri wins on blue, loses on red, then wins on red: 2 of 3.
pub fn ahri_matches() -> Vec<MatchRecordWide> {
    vec![
        wide(
            "NA1_1",
            ["Garen", "LeeSin", "Ahri", "Jinx", "Thresh"],
            ["Darius", "Vi", "Syndra", "Caitlyn", "Lulu"],
            true,
        ),
        wide(
            "NA1_2",
            ["Ornn", "Elise", "Orianna", "Ezreal", "Nami"],
            ["Garen", "Sejuani", "Ahri", "Jinx", "Thresh"],
            false,
        ),
        wide(
            "NA1_3",
            ["Darius", "Vi", "Syndra", "Caitlyn", "Lulu"],
            ["Ahri", "LeeSin", "Orianna", "Ezreal", "Nami"],
            true,
        ),
    ]
}

/// Store holding `records`, already derived.
pub fn derived_store(records: Vec<MatchRecordWide>) -> Arc<MatchStore> {
    let (store, duplicates) = MatchStore::from_records(records);
    assert_eq!(duplicates, 0, "fixtures have unique ids");
    Arc::new(store)
}

/// Query service wrapper counting how often aggregation runs.
pub struct CountingQuery {
    inner: WinrateQueryService,
    calls: AtomicUsize,
}

impl CountingQuery {
    pub fn new(store: Arc<MatchStore>) -> Self {
        Self {
            inner: WinrateQueryService::new(store),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WinrateQuery for CountingQuery {
    async fn winrate(
        &self,
        champion: &ChampionId,
        version: TableVersion,
    ) -> Result<Winrate, WinrateQueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.winrate(champion, version).await
    }
}

/// Gateway over `store` plus handles on its query counter and cache.
pub struct Harness {
    pub gateway: Arc<WinrateGateway>,
    pub query: Arc<CountingQuery>,
    pub cache: Arc<LruWinrateCache>,
}

pub fn harness(store: Arc<MatchStore>, version: TableVersion) -> Harness {
    let query = Arc::new(CountingQuery::new(store));
    let cache = Arc::new(LruWinrateCache::new(
        NonZeroUsize::new(10).expect("non-zero capacity"),
    ));
    let cache_port: Arc<dyn WinrateCache> = cache.clone();
    let gateway = Arc::new(WinrateGateway::new(
        GatewayPorts {
            query: query.clone(),
            cache: cache_port,
            metrics: Arc::new(NoOpQueryLatencyMetrics),
        },
        GatewaySettings {
            version,
            ..GatewaySettings::default()
        },
    ));
    Harness {
        gateway,
        query,
        cache,
    }
}
