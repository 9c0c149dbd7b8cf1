//! Bounded cache of computed legs

use std::collections::HashMap;

use log::trace;

use super::route::Route;

/// Result of one leg search; `None` records an unreachable pair.
pub type CachedLeg = Option<Route>;

/// Least-recently-used cache keyed by `(start_node, end_node)`.
///
/// Recency is an explicit use counter per entry; inserting into a full cache
/// evicts the entry with the oldest use.
pub struct RouteCache {
    capacity: usize,
    clock: u64,
    entries: HashMap<(u32, u32), (CachedLeg, u64)>,
}

impl RouteCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            clock: 0,
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Cached leg for the pair, marking it as most recently used.
    pub fn get(&mut self, start: u32, end: u32) -> Option<&CachedLeg> {
        let now = self.tick();
        match self.entries.get_mut(&(start, end)) {
            Some((leg, last_used)) => {
                trace!("Route cache hit {start} -> {end}");
                *last_used = now;
                Some(leg)
            }
            None => {
                trace!("Route cache miss {start} -> {end}");
                None
            }
        }
    }

    pub fn insert(&mut self, start: u32, end: u32, leg: CachedLeg) {
        let now = self.tick();
        if !self.entries.contains_key(&(start, end)) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, last_used))| *last_used)
                .map(|(&key, _)| key);
            if let Some(key) = oldest {
                trace!("Route cache evicts {} -> {}", key.0, key.1);
                self.entries.remove(&key);
            }
        }
        self.entries.insert((start, end), (leg, now));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
