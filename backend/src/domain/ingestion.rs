//! Batch ingestion into the match store.
//!
//! New rows are persisted first and only then appended to the store, so a
//! failed write leaves neither memory nor disk changed and the batch can be
//! retried as is. The narrow table is re-derived once per batch and the
//! recency cache is cleared so no answer computed against the previous
//! snapshot survives the swap.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::domain::ports::{MatchRepository, MatchRepositoryError, WinrateCache};
use crate::domain::{AppendOutcome, Error, MatchRecordWide, MatchStore};

/// Counts reported after a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestionSummary {
    /// Rows that were new and are now stored.
    pub appended: usize,
    /// Rows skipped because their `match_id` was already present.
    pub duplicates: usize,
}

fn map_repository_error(err: &MatchRepositoryError) -> Error {
    error!(error = %err, "failed to persist ingested matches");
    Error::internal(format!("match storage failed: {err}"))
}

/// Ingestion use-case shared by the feed follower and the CLI.
#[derive(Clone)]
pub struct IngestionService {
    store: Arc<MatchStore>,
    repository: Arc<dyn MatchRepository>,
    cache: Option<Arc<dyn WinrateCache>>,
    // Serialises batches between the duplicate check and the append.
    batch_lock: Arc<Mutex<()>>,
}

impl IngestionService {
    /// Create a service writing to `store` and persisting through
    /// `repository`.
    pub fn new(store: Arc<MatchStore>, repository: Arc<dyn MatchRepository>) -> Self {
        Self {
            store,
            repository,
            cache: None,
            batch_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Clear `cache` whenever a batch is derived.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn WinrateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Persist the new rows of a batch, append them and re-derive the narrow
    /// table.
    ///
    /// Duplicates, against the store or earlier in the same batch, are
    /// counted rather than treated as failures and are never persisted.
    ///
    /// # Errors
    /// Returns an `internal_error` [`Error`] when the repository rejects the
    /// write. The store is left untouched, so retrying the same batch
    /// persists it.
    pub async fn ingest_batch(
        &self,
        records: impl IntoIterator<Item = MatchRecordWide> + Send,
    ) -> Result<IngestionSummary, Error> {
        let _batch = self.batch_lock.lock().await;
        let (fresh, duplicates) = self.store.partition_new(records);
        if !fresh.is_empty() {
            self.repository
                .append(&fresh)
                .await
                .map_err(|err| map_repository_error(&err))?;
        }

        let mut summary = IngestionSummary {
            appended: 0,
            duplicates,
        };
        for record in fresh {
            match self.store.append(record) {
                AppendOutcome::Appended => summary.appended += 1,
                // Appended directly to the store by another writer.
                AppendOutcome::Duplicate => summary.duplicates += 1,
            }
        }

        let narrow_rows = self.store.derive();
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        info!(
            appended = summary.appended,
            duplicates = summary.duplicates,
            narrow_rows,
            "match batch ingested"
        );
        Ok(summary)
    }
}
