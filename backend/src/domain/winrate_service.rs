//! Query service answering winrates from the shared match store.
//!
//! Aggregation scans the whole snapshot, so it runs on the blocking pool to
//! keep request workers responsive and to let callers time it out.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::domain::ports::{WinrateQuery, WinrateQueryError};
use crate::domain::{
    AggregationError, ChampionId, MatchStore, TableVersion, Winrate, compute_winrate,
};

/// [`WinrateQuery`] implementation backed by a [`MatchStore`].
///
/// Holds only the store handle; results are never cached here.
#[derive(Debug, Clone)]
pub struct WinrateQueryService {
    store: Arc<MatchStore>,
}

impl WinrateQueryService {
    /// Create a service reading from `store`.
    pub const fn new(store: Arc<MatchStore>) -> Self {
        Self { store }
    }
}

fn map_aggregation_error(champion: &ChampionId, err: AggregationError) -> WinrateQueryError {
    match err {
        AggregationError::NoData => WinrateQueryError::no_data(champion.as_str()),
        AggregationError::InconsistentCounts { .. } => {
            error!(champion = %champion, error = %err, "aggregation invariant violated");
            WinrateQueryError::internal(err.to_string())
        }
    }
}

#[async_trait]
impl WinrateQuery for WinrateQueryService {
    async fn winrate(
        &self,
        champion: &ChampionId,
        version: TableVersion,
    ) -> Result<Winrate, WinrateQueryError> {
        let snapshot = self.store.snapshot();
        let key = champion.clone();
        let result =
            tokio::task::spawn_blocking(move || compute_winrate(&snapshot, &key, version))
                .await
                .map_err(|join_err| {
                    error!(champion = %champion, error = %join_err, "aggregation task failed");
                    WinrateQueryError::internal(format!("aggregation task failed: {join_err}"))
                })?;
        result.map_err(|err| map_aggregation_error(champion, err))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::matches::fixtures::{ahri_matches, champion};

    fn service() -> WinrateQueryService {
        let (store, _) = MatchStore::from_records(ahri_matches());
        WinrateQueryService::new(Arc::new(store))
    }

    #[rstest]
    #[case(TableVersion::V1)]
    #[case(TableVersion::V2)]
    #[tokio::test]
    async fn answers_from_current_snapshot(#[case] version: TableVersion) {
        let winrate = service()
            .winrate(&champion("Ahri"), version)
            .await
            .expect("Ahri has games");
        assert!((winrate.value() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_champion_maps_to_no_data() {
        let err = service()
            .winrate(&champion("NonexistentChampion"), TableVersion::V2)
            .await
            .expect_err("no games");
        assert_eq!(err, WinrateQueryError::no_data("NonexistentChampion"));
    }

    #[rstest]
    #[tokio::test]
    async fn sees_rows_only_after_derive() {
        let store = Arc::new(MatchStore::new());
        let service = WinrateQueryService::new(Arc::clone(&store));
        for record in ahri_matches() {
            store.append(record);
        }
        assert!(service.winrate(&champion("Ahri"), TableVersion::V2).await.is_err());

        store.derive();
        let winrate = service
            .winrate(&champion("Ahri"), TableVersion::V2)
            .await
            .expect("derived rows visible");
        assert!(winrate.value() > 0.0);
    }

    #[rstest]
    fn inconsistent_counts_become_internal() {
        let err = map_aggregation_error(
            &champion("Ahri"),
            AggregationError::InconsistentCounts {
                wins: 3,
                appearances: 2,
            },
        );
        assert!(matches!(err, WinrateQueryError::Internal { .. }));
    }
}
