//! Port for the bounded recency cache in front of aggregation.
//!
//! The cache is in-memory and infallible: a miss is an ordinary `None`.
//! Every [`WinrateCache::clear`] advances a generation counter so a writer
//! that computed its value before the clear can be turned away.

use crate::domain::{ChampionId, Winrate};

/// Bounded map from champion to its last computed winrate.
#[cfg_attr(test, mockall::automock)]
pub trait WinrateCache: Send + Sync {
    /// Look up a cached winrate, promoting the entry to most recently used.
    fn get(&self, champion: &ChampionId) -> Option<Winrate>;

    /// Insert or refresh an entry, evicting the least recently used entry
    /// when full.
    fn put(&self, champion: ChampionId, winrate: Winrate);

    /// Current generation; advanced by every [`clear`](Self::clear).
    fn generation(&self) -> u64;

    /// [`put`](Self::put) unless the cache was cleared after `generation`
    /// was read. Returns whether the entry was stored.
    fn put_if_current(&self, generation: u64, champion: ChampionId, winrate: Winrate) -> bool;

    /// Drop every entry. Called after the match table is re-derived.
    fn clear(&self);
}
