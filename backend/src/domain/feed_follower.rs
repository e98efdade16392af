//! Background follower applying rows other writers append to storage.
//!
//! Each poll drains the [`MatchFeed`] and hands the rows to an
//! [`IngestionService`], which re-derives the narrow table and clears the
//! recency cache. Rows from the feed are already durable, so the service is
//! normally built over a `NoOpMatchRepository`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::domain::ports::MatchFeed;
use crate::domain::{Error, IngestionService, IngestionSummary};

/// Default pause between feed polls.
pub const DEFAULT_FEED_INTERVAL: Duration = Duration::from_secs(5);

/// Drives a [`MatchFeed`] into the served match store.
#[derive(Clone)]
pub struct FeedFollower {
    feed: Arc<dyn MatchFeed>,
    ingestion: IngestionService,
}

impl FeedFollower {
    /// Follow `feed`, landing its rows through `ingestion`.
    pub fn new(feed: Arc<dyn MatchFeed>, ingestion: IngestionService) -> Self {
        Self { feed, ingestion }
    }

    /// Ingest whatever the feed has gained since the last poll.
    ///
    /// Returns `None` without touching the store or cache when nothing new
    /// arrived.
    ///
    /// # Errors
    /// Returns an `internal_error` [`Error`] when the feed cannot be read or
    /// ingestion fails.
    pub async fn poll_once(&self) -> Result<Option<IngestionSummary>, Error> {
        let records = self.feed.next_batch().await.map_err(|err| {
            error!(error = %err, "failed to read match feed");
            Error::internal(format!("match feed failed: {err}"))
        })?;
        if records.is_empty() {
            return Ok(None);
        }
        self.ingestion.ingest_batch(records).await.map(Some)
    }

    /// Poll every `interval` until the task is dropped. Failures are logged
    /// and retried on the next tick.
    pub async fn run(self, interval: Duration) {
        // `time::interval` panics on a zero period.
        let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(Some(summary)) => info!(
                    appended = summary.appended,
                    duplicates = summary.duplicates,
                    "match feed applied"
                ),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "match feed poll failed, retrying"),
            }
        }
    }
}
