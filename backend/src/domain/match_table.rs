//! In-memory match store holding the wide table and its derived snapshot.
//!
//! Appends accumulate in the wide table under a write lock. Readers never see
//! the wide table directly: they take a [`TableSnapshot`], which is rebuilt
//! in full by [`MatchStore::derive`] and swapped in behind an `Arc`, so a
//! query observes either the previous snapshot or the new one.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::ChampionId;
use super::matches::{MatchId, MatchRecordNarrow, MatchRecordWide};

/// Result of appending a record to the wide table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The record was new and has been stored.
    Appended,
    /// A record with the same `match_id` already exists; nothing changed.
    Duplicate,
}

/// Immutable view of both table versions as of the last derivation.
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    wide: Arc<[MatchRecordWide]>,
    narrow: Arc<[MatchRecordNarrow]>,
}

impl TableSnapshot {
    /// Build a snapshot by exploding every wide row.
    pub fn derive_from(wide: &[MatchRecordWide]) -> Self {
        let narrow: Arc<[MatchRecordNarrow]> =
            wide.iter().flat_map(MatchRecordWide::explode).collect();
        Self {
            wide: wide.into(),
            narrow,
        }
    }

    /// Wide rows in this snapshot.
    pub fn wide(&self) -> &[MatchRecordWide] {
        &self.wide
    }

    /// Narrow rows in this snapshot.
    pub fn narrow(&self) -> &[MatchRecordNarrow] {
        &self.narrow
    }

    /// Wide rows in which the champion fills any of the ten slots.
    ///
    /// The iterator borrows the snapshot and can be recreated at will.
    pub fn filter_wide<'a>(
        &'a self,
        champion: &'a ChampionId,
    ) -> impl Iterator<Item = &'a MatchRecordWide> + 'a {
        self.wide
            .iter()
            .filter(move |record| record.side_of(champion).is_some())
    }

    /// Narrow rows for the champion.
    pub fn filter_narrow<'a>(
        &'a self,
        champion: &'a ChampionId,
    ) -> impl Iterator<Item = &'a MatchRecordNarrow> + 'a {
        self.narrow
            .iter()
            .filter(move |row| row.champion == *champion)
    }
}

#[derive(Debug, Default)]
struct MatchTable {
    wide: Vec<MatchRecordWide>,
    ids: HashSet<MatchId>,
    snapshot: TableSnapshot,
}

/// Shared owner of the match tables.
///
/// Constructed once by the composition root and handed to the query and
/// ingestion services behind an `Arc`.
#[derive(Debug, Default)]
pub struct MatchStore {
    table: RwLock<MatchTable>,
}

impl MatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from previously persisted rows and derive its snapshot.
    ///
    /// Returns the store and the number of rows skipped as duplicates.
    pub fn from_records(records: impl IntoIterator<Item = MatchRecordWide>) -> (Self, usize) {
        let store = Self::new();
        let duplicates = records
            .into_iter()
            .map(|record| store.append(record))
            .filter(|outcome| *outcome == AppendOutcome::Duplicate)
            .count();
        store.derive();
        (store, duplicates)
    }

    /// Append a wide record unless its `match_id` is already present.
    ///
    /// The record becomes visible to readers after the next
    /// [`derive`](Self::derive).
    pub fn append(&self, record: MatchRecordWide) -> AppendOutcome {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if !table.ids.insert(record.match_id().clone()) {
            debug!(match_id = %record.match_id(), "duplicate match skipped");
            return AppendOutcome::Duplicate;
        }
        table.wide.push(record);
        AppendOutcome::Appended
    }

    /// Rebuild the narrow table from the whole wide table and swap the new
    /// snapshot in. Returns the number of narrow rows.
    pub fn derive(&self) -> usize {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = TableSnapshot::derive_from(&table.wide);
        let rows = snapshot.narrow().len();
        table.snapshot = snapshot;
        debug!(wide_rows = table.wide.len(), narrow_rows = rows, "narrow table derived");
        rows
    }

    /// Current snapshot. Cheap: clones two `Arc`s.
    pub fn snapshot(&self) -> TableSnapshot {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    /// Number of wide rows appended so far, derived or not.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .wide
            .len()
    }

    /// Whether no rows have been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split `records` into rows that would be appended and a count of the
    /// rest.
    ///
    /// A row is kept when its `match_id` is neither stored nor repeated
    /// earlier in the batch. Nothing is written; callers follow up with
    /// [`append`](Self::append) once the kept rows are durable.
    pub fn partition_new(
        &self,
        records: impl IntoIterator<Item = MatchRecordWide>,
    ) -> (Vec<MatchRecordWide>, usize) {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let mut batch_ids = HashSet::new();
        let mut fresh = Vec::new();
        let mut duplicates = 0;
        for record in records {
            if table.ids.contains(record.match_id()) || !batch_ids.insert(record.match_id().clone())
            {
                duplicates += 1;
            } else {
                fresh.push(record);
            }
        }
        (fresh, duplicates)
    }

    /// Whether a record with this id has been appended.
    pub fn contains(&self, match_id: &MatchId) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ids
            .contains(match_id)
    }
}
