//! Fixed-capacity least-recently-used map with O(1) operations.
//!
//! Entries live in a slab (`Vec`) and are threaded into a doubly linked
//! recency list by index. The hash map resolves a key to its slab slot, so
//! lookup, promotion, insertion and eviction never scan the list.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Bounded map evicting the least recently used entry when full.
///
/// Recency is a total order: every successful [`get`](Self::get) and every
/// [`put`](Self::put) moves the entry to the front.
#[derive(Debug, Clone)]
pub struct LruMap<K, V> {
    capacity: NonZeroUsize,
    index: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    // Most recently used.
    head: Option<usize>,
    // Least recently used.
    tail: Option<usize>,
}

impl<K, V> LruMap<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create an empty map holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            index: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Maximum number of entries.
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up `key` and promote it to most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.promote(idx);
        Some(&self.nodes[idx].value)
    }

    /// Look up `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Insert or update `key`, returning the evicted entry if the map was
    /// full and `key` was new.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.nodes[idx].value = value;
            self.promote(idx);
            return None;
        }

        if self.nodes.len() < self.capacity.get() {
            let idx = self.nodes.len();
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.index.insert(key, idx);
            self.attach_front(idx);
            return None;
        }

        // Full: reuse the tail's slot for the new entry.
        let idx = self.tail?;
        self.detach(idx);
        let evicted = std::mem::replace(
            &mut self.nodes[idx],
            Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            },
        );
        self.index.remove(&evicted.key);
        self.index.insert(key, idx);
        self.attach_front(idx);
        Some((evicted.key, evicted.value))
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.detach(idx);
        let removed = self.nodes.swap_remove(idx);
        if idx < self.nodes.len() {
            // The former last node now occupies `idx`; repoint its neighbours.
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.index.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }
        Some(removed.value)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        std::iter::successors(self.head, |&idx| self.nodes[idx].next)
            .map(|idx| &self.nodes[idx].key)
    }

    fn promote(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.detach(idx);
            self.attach_front(idx);
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }
}
