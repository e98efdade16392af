//! Source of wide rows written by another process.
//!
//! The feed follows storage that some other writer appends to, such as the
//! `ingest-matches` command, and hands over only rows it has not returned
//! before.

use async_trait::async_trait;

use crate::domain::MatchRecordWide;

use super::MatchRepositoryError;

/// Port yielding rows appended to storage since the previous call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchFeed: Send + Sync {
    /// Rows that became available since the last call, in storage order.
    ///
    /// The first call returns everything stored so far. An empty batch means
    /// nothing new has been written.
    async fn next_batch(&self) -> Result<Vec<MatchRecordWide>, MatchRepositoryError>;
}
