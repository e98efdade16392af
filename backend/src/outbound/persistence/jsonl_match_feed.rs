//! `MatchFeed` adapter following the JSON-lines store file.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::jsonl_match_repository::{StoreCursor, StoreFile, StoreRead, run_blocking};
use crate::domain::MatchRecordWide;
use crate::domain::ports::{MatchFeed, MatchRepositoryError};

/// Tails a JSON-lines store, yielding complete rows past its cursor.
///
/// Built with [`JsonlMatchRepository::feed`](super::JsonlMatchRepository::feed).
/// An unterminated last line is left in place until its newline arrives.
pub struct JsonlMatchFeed {
    file: Arc<StoreFile>,
    cursor: Mutex<StoreCursor>,
}

impl JsonlMatchFeed {
    pub(super) fn new(file: Arc<StoreFile>) -> Self {
        Self {
            file,
            cursor: Mutex::new(StoreCursor::default()),
        }
    }
}

#[async_trait]
impl MatchFeed for JsonlMatchFeed {
    async fn next_batch(&self) -> Result<Vec<MatchRecordWide>, MatchRepositoryError> {
        let mut cursor = self.cursor.lock().await;
        let from = *cursor;
        let StoreRead {
            records,
            cursor: next,
            tail,
        } = run_blocking(&self.file, move |file| file.read_from(from)).await?;
        if !tail.trim().is_empty() {
            warn!(
                path = %self.file.path.display(),
                bytes = tail.len(),
                "unterminated final row left for a later read"
            );
        }
        *cursor = next;
        debug!(
            path = %self.file.path.display(),
            rows = records.len(),
            offset = next.offset,
            "match feed read"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::matches::fixtures::ahri_matches;
    use crate::domain::ports::MatchRepository;
    use crate::outbound::persistence::JsonlMatchRepository;

    #[rstest]
    #[tokio::test]
    async fn feed_returns_each_row_once() {
        let dir = TempDir::new().expect("temp dir");
        let repo =
            JsonlMatchRepository::open(dir.path().join("matches.jsonl")).expect("open repository");
        let feed = repo.feed();
        assert!(feed.next_batch().await.expect("missing file").is_empty());

        let records = ahri_matches();
        repo.append(&records[..2]).await.expect("append");
        assert_eq!(feed.next_batch().await.expect("first batch"), records[..2]);
        assert!(feed.next_batch().await.expect("nothing new").is_empty());

        repo.append(&records[2..]).await.expect("append");
        assert_eq!(feed.next_batch().await.expect("second batch"), records[2..]);
    }

    #[rstest]
    #[tokio::test]
    async fn new_feed_starts_from_the_first_row() {
        let dir = TempDir::new().expect("temp dir");
        let repo =
            JsonlMatchRepository::open(dir.path().join("matches.jsonl")).expect("open repository");
        repo.append(&ahri_matches()).await.expect("append");

        let batch = repo.feed().next_batch().await.expect("initial batch");
        assert_eq!(batch, ahri_matches());
    }
}
