//! In-process recency cache for computed winrates.
//!
//! [`LruWinrateCache`] implements the `WinrateCache` port on top of
//! [`LruMap`]. One mutex guards the whole map together with its generation
//! counter: the cache is small and every operation is O(1), so contention
//! stays low. Entries can optionally expire after a time-to-live measured
//! against an injected clock.

mod lru;

pub use lru::LruMap;

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use tracing::debug;

use crate::domain::ports::WinrateCache;
use crate::domain::{ChampionId, Winrate};

/// Default number of cached champions.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone, Copy)]
struct CachedWinrate {
    winrate: Winrate,
    stored_at: DateTime<Utc>,
}

struct Entries {
    map: LruMap<ChampionId, CachedWinrate>,
    generation: u64,
}

/// Bounded LRU cache from champion to winrate.
pub struct LruWinrateCache {
    entries: Mutex<Entries>,
    ttl: Option<TimeDelta>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl LruWinrateCache {
    /// Create a cache holding at most `capacity` champions, without expiry.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                map: LruMap::new(capacity),
                generation: 0,
            }),
            ttl: None,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Expire entries older than `ttl`. A zero duration disables expiry.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = if ttl.is_zero() {
            None
        } else {
            Some(TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX))
        };
        self
    }

    /// Measure entry age against `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of cached champions.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // LruMap never panics midway through an update; a poisoned map is intact.
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &CachedWinrate, now: DateTime<Utc>) -> bool {
        self.ttl
            .is_some_and(|ttl| now.signed_duration_since(entry.stored_at) >= ttl)
    }
}

fn log_eviction(evicted: Option<(ChampionId, CachedWinrate)>) {
    if let Some((evicted, _)) = evicted {
        debug!(champion = %evicted, "evicted least recently used winrate");
    }
}

impl WinrateCache for LruWinrateCache {
    fn get(&self, champion: &ChampionId) -> Option<Winrate> {
        let now = self.clock.utc();
        let mut entries = self.lock();
        let entry = *entries.map.peek(champion)?;
        if self.is_expired(&entry, now) {
            entries.map.remove(champion);
            debug!(champion = %champion, "cached winrate expired");
            return None;
        }
        entries.map.get(champion).map(|cached| cached.winrate)
    }

    fn put(&self, champion: ChampionId, winrate: Winrate) {
        let stored_at = self.clock.utc();
        let evicted = self
            .lock()
            .map
            .put(champion, CachedWinrate { winrate, stored_at });
        log_eviction(evicted);
    }

    fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn put_if_current(&self, generation: u64, champion: ChampionId, winrate: Winrate) -> bool {
        let stored_at = self.clock.utc();
        let mut entries = self.lock();
        if entries.generation != generation {
            debug!(champion = %champion, "stale winrate dropped after cache clear");
            return false;
        }
        let evicted = entries
            .map
            .put(champion, CachedWinrate { winrate, stored_at });
        drop(entries);
        log_eviction(evicted);
        true
    }

    fn clear(&self) {
        let mut entries = self.lock();
        entries.map.clear();
        entries.generation = entries.generation.wrapping_add(1);
        drop(entries);
        debug!("winrate cache cleared");
    }
}
