//! Tests for the winrate gateway.

use std::collections::HashMap;
use std::sync::Mutex;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockQueryLatencyMetrics, MockWinrateCache, MockWinrateQuery, NoOpQueryLatencyMetrics,
    QueryLatencyMetricsError,
};

#[derive(Default)]
struct MapCache(Mutex<(HashMap<ChampionId, Winrate>, u64)>);

impl WinrateCache for MapCache {
    fn get(&self, champion: &ChampionId) -> Option<Winrate> {
        self.0.lock().expect("cache lock").0.get(champion).copied()
    }

    fn put(&self, champion: ChampionId, winrate: Winrate) {
        self.0.lock().expect("cache lock").0.insert(champion, winrate);
    }

    fn generation(&self) -> u64 {
        self.0.lock().expect("cache lock").1
    }

    fn put_if_current(&self, generation: u64, champion: ChampionId, winrate: Winrate) -> bool {
        let mut guard = self.0.lock().expect("cache lock");
        if guard.1 != generation {
            return false;
        }
        guard.0.insert(champion, winrate);
        true
    }

    fn clear(&self) {
        let mut guard = self.0.lock().expect("cache lock");
        guard.0.clear();
        guard.1 += 1;
    }
}

/// Query that clears the cache before answering, as ingestion would when
/// it lands while aggregation is running.
struct ClearingQuery(Arc<MapCache>);

#[async_trait]
impl WinrateQuery for ClearingQuery {
    async fn winrate(
        &self,
        _champion: &ChampionId,
        _version: TableVersion,
    ) -> Result<Winrate, WinrateQueryError> {
        self.0.clear();
        Ok(two_thirds())
    }
}

struct SlowQuery(Duration);

#[async_trait]
impl WinrateQuery for SlowQuery {
    async fn winrate(
        &self,
        _champion: &ChampionId,
        _version: TableVersion,
    ) -> Result<Winrate, WinrateQueryError> {
        tokio::time::sleep(self.0).await;
        Winrate::from_counts(1, 2).map_err(|err| WinrateQueryError::internal(err.to_string()))
    }
}

fn two_thirds() -> Winrate {
    Winrate::from_counts(2, 3).expect("valid counts")
}

fn gateway_with(
    query: impl WinrateQuery + 'static,
    cache: Arc<dyn WinrateCache>,
    metrics: impl QueryLatencyMetrics + 'static,
    settings: GatewaySettings,
) -> WinrateGateway {
    WinrateGateway::new(
        GatewayPorts {
            query: Arc::new(query),
            cache,
            metrics: Arc::new(metrics),
        },
        settings,
    )
}

#[fixture]
fn cache() -> Arc<MapCache> {
    Arc::new(MapCache::default())
}

#[rstest]
#[tokio::test]
async fn second_lookup_is_served_from_cache(cache: Arc<MapCache>) {
    let mut query = MockWinrateQuery::new();
    query
        .expect_winrate()
        .withf(|champion, version| champion.as_str() == "Ahri" && *version == TableVersion::V2)
        .times(1)
        .returning(|_, _| Ok(two_thirds()));
    let gateway = gateway_with(
        query,
        cache.clone(),
        NoOpQueryLatencyMetrics,
        GatewaySettings::default(),
    );

    let first = gateway.lookup("Ahri").await.expect("first lookup");
    let second = gateway.lookup("Ahri").await.expect("second lookup");

    assert_eq!(first.champion_name, "Ahri");
    assert!((first.winrate.value() - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(first, second);
    assert_eq!(cache.get(&ChampionId::new("Ahri").expect("valid")), Some(two_thirds()));
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_names_are_rejected_before_any_lookup(#[case] name: &str) {
    let mut query = MockWinrateQuery::new();
    query.expect_winrate().times(0);
    let mut cache = MockWinrateCache::new();
    cache.expect_get().times(0);
    cache.expect_put_if_current().times(0);
    let gateway = gateway_with(
        query,
        Arc::new(cache),
        NoOpQueryLatencyMetrics,
        GatewaySettings::default(),
    );

    let err = gateway.lookup(name).await.expect_err("blank name");
    assert_eq!(err.code(), ErrorCode::BadRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("champion_name")
    );
}

#[rstest]
#[tokio::test]
async fn overlong_names_are_rejected() {
    let gateway = gateway_with(
        MockWinrateQuery::new(),
        Arc::new(MapCache::default()),
        NoOpQueryLatencyMetrics,
        GatewaySettings::default(),
    );
    let err = gateway
        .lookup(&"x".repeat(100))
        .await
        .expect_err("overlong name");
    assert_eq!(err.code(), ErrorCode::BadRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
        Some("too_long")
    );
}

#[rstest]
#[tokio::test]
async fn cache_hit_skips_the_query_service() {
    let mut query = MockWinrateQuery::new();
    query.expect_winrate().times(0);
    let mut cache = MockWinrateCache::new();
    cache
        .expect_get()
        .withf(|champion| champion.as_str() == "Jinx")
        .times(1)
        .returning(|_| Winrate::new(0.25));
    cache.expect_generation().times(0);
    cache.expect_put_if_current().times(0);
    let mut metrics = MockQueryLatencyMetrics::new();
    metrics.expect_record().times(0);
    let gateway = gateway_with(query, Arc::new(cache), metrics, GatewaySettings::default());

    let answer = gateway.lookup(" Jinx ").await.expect("cache hit");
    assert_eq!(answer.champion_name, "Jinx");
    assert_eq!(answer.winrate, Winrate::new(0.25).expect("in range"));
}

#[rstest]
#[tokio::test]
async fn no_data_is_not_found_and_not_cached(cache: Arc<MapCache>) {
    let mut query = MockWinrateQuery::new();
    query
        .expect_winrate()
        .times(2)
        .returning(|champion, _| Err(WinrateQueryError::no_data(champion.as_str())));
    let mut metrics = MockQueryLatencyMetrics::new();
    metrics
        .expect_record()
        .withf(|outcome, _| *outcome == QueryOutcome::NotFound)
        .times(2)
        .returning(|_, _| Ok(()));
    let gateway = gateway_with(query, cache.clone(), metrics, GatewaySettings::default());

    for _ in 0..2 {
        let err = gateway.lookup("Teemo").await.expect_err("no data");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
    assert!(cache.get(&ChampionId::new("Teemo").expect("valid")).is_none());
}

#[rstest]
#[tokio::test]
async fn internal_query_failures_surface_as_internal(cache: Arc<MapCache>) {
    let mut query = MockWinrateQuery::new();
    query
        .expect_winrate()
        .times(1)
        .returning(|_, _| Err(WinrateQueryError::internal("counts diverged")));
    let gateway = gateway_with(
        query,
        cache.clone(),
        NoOpQueryLatencyMetrics,
        GatewaySettings::default(),
    );

    let err = gateway.lookup("Ahri").await.expect_err("internal failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert!(cache.get(&ChampionId::new("Ahri").expect("valid")).is_none());
}

#[rstest]
#[tokio::test]
async fn slow_queries_time_out_and_are_not_cached(cache: Arc<MapCache>) {
    let mut metrics = MockQueryLatencyMetrics::new();
    metrics
        .expect_record()
        .withf(|outcome, _| *outcome == QueryOutcome::Timeout)
        .times(1)
        .returning(|_, _| Ok(()));
    let settings = GatewaySettings {
        query_timeout: Duration::from_millis(10),
        ..GatewaySettings::default()
    };
    let gateway = gateway_with(
        SlowQuery(Duration::from_secs(5)),
        cache.clone(),
        metrics,
        settings,
    );

    let err = gateway.lookup("Ahri").await.expect_err("timed out");
    assert_eq!(err.code(), ErrorCode::Timeout);
    assert!(err.code().is_retryable());
    assert!(cache.get(&ChampionId::new("Ahri").expect("valid")).is_none());
}

#[rstest]
#[tokio::test]
async fn configured_version_is_forwarded(cache: Arc<MapCache>) {
    let mut query = MockWinrateQuery::new();
    query
        .expect_winrate()
        .withf(|_, version| *version == TableVersion::V1)
        .times(1)
        .returning(|_, _| Ok(two_thirds()));
    let settings = GatewaySettings {
        version: TableVersion::V1,
        ..GatewaySettings::default()
    };
    let gateway = gateway_with(query, cache, NoOpQueryLatencyMetrics, settings);

    gateway.lookup("Ahri").await.expect("v1 lookup");
    assert_eq!(gateway.settings().version, TableVersion::V1);
}

#[rstest]
#[tokio::test]
async fn metrics_failures_do_not_fail_the_lookup(cache: Arc<MapCache>) {
    let mut query = MockWinrateQuery::new();
    query
        .expect_winrate()
        .times(1)
        .returning(|_, _| Ok(two_thirds()));
    let mut metrics = MockQueryLatencyMetrics::new();
    metrics
        .expect_record()
        .withf(|outcome, _| *outcome == QueryOutcome::Ok)
        .times(1)
        .returning(|_, _| Err(QueryLatencyMetricsError::export("registry gone")));
    let gateway = gateway_with(query, cache, metrics, GatewaySettings::default());

    let answer = gateway.lookup("Ahri").await.expect("lookup succeeds");
    assert_eq!(answer.winrate, two_thirds());
}

#[rstest]
#[tokio::test]
async fn answer_computed_across_a_clear_is_not_cached(cache: Arc<MapCache>) {
    let gateway = gateway_with(
        ClearingQuery(cache.clone()),
        cache.clone(),
        NoOpQueryLatencyMetrics,
        GatewaySettings::default(),
    );

    let answer = gateway.lookup("Ahri").await.expect("lookup succeeds");

    assert_eq!(answer.winrate, two_thirds());
    assert!(cache.get(&ChampionId::new("Ahri").expect("valid")).is_none());
}

#[rstest]
#[tokio::test]
async fn miss_stores_under_the_generation_read_before_the_query() {
    let mut query = MockWinrateQuery::new();
    query
        .expect_winrate()
        .times(1)
        .returning(|_, _| Ok(two_thirds()));
    let mut cache = MockWinrateCache::new();
    cache.expect_get().times(1).returning(|_| None);
    cache.expect_generation().times(1).return_const(7_u64);
    cache
        .expect_put_if_current()
        .withf(|generation, champion, _| *generation == 7 && champion.as_str() == "Ahri")
        .times(1)
        .return_const(true);
    let gateway = gateway_with(
        query,
        Arc::new(cache),
        NoOpQueryLatencyMetrics,
        GatewaySettings::default(),
    );

    gateway.lookup("Ahri").await.expect("lookup succeeds");
}
