//! Storage collaborator for wide match rows.

use async_trait::async_trait;

use crate::domain::MatchRecordWide;

use super::define_port_error;

define_port_error! {
    /// Errors raised by match storage adapters.
    pub enum MatchRepositoryError {
        /// Underlying storage could not be read or written.
        Io { message: String } => "match storage I/O failed: {message}",
        /// A stored row could not be decoded.
        Decode { line: usize, message: String } =>
            "match storage row {line} is invalid: {message}",
    }
}

/// Port for loading and appending persisted wide rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Read every stored row in insertion order.
    async fn load_all(&self) -> Result<Vec<MatchRecordWide>, MatchRepositoryError>;

    /// Persist rows after those already stored.
    async fn append(&self, records: &[MatchRecordWide]) -> Result<(), MatchRepositoryError>;
}

/// Repository that stores nothing.
///
/// Used for rows that are already durable, such as those the feed follower
/// reads back from the store file.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMatchRepository;

#[async_trait]
impl MatchRepository for NoOpMatchRepository {
    async fn load_all(&self) -> Result<Vec<MatchRecordWide>, MatchRepositoryError> {
        Ok(Vec::new())
    }

    async fn append(&self, _records: &[MatchRecordWide]) -> Result<(), MatchRepositoryError> {
        Ok(())
    }
}
