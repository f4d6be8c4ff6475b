//! Time- and size-bounded memoization of extracted records
//!
//! One cache per orchestrator (per site), keyed by source URL. Expiry is
//! lazy: an expired entry is deleted when read, never proactively swept.
//! Capacity eviction drops the oldest-inserted entry, by insertion order
//! rather than recency of use.

use crate::model::ScrapedProduct;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
struct CacheEntry {
    product: ScrapedProduct,
    inserted_at: DateTime<Utc>,
}

/// Per-site result cache
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<String, CacheEntry>,
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    /// Creates a cache with the given TTL and capacity
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Returns the live record for a URL, if present and within TTL
    ///
    /// An expired entry is removed and treated as absent.
    pub fn get(&mut self, url: &str) -> Option<ScrapedProduct> {
        let expired = match self.entries.get(url) {
            Some(entry) => Utc::now() - entry.inserted_at > self.ttl,
            None => return None,
        };

        if expired {
            self.remove(url);
            return None;
        }

        self.entries.get(url).map(|entry| entry.product.clone())
    }

    /// Inserts a record, evicting the oldest-inserted entry when at capacity
    ///
    /// Re-inserting an existing key refreshes its timestamp and moves it to
    /// the back of the insertion order.
    pub fn put(&mut self, url: &str, product: ScrapedProduct) {
        if self.entries.contains_key(url) {
            self.remove(url);
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            url.to_string(),
            CacheEntry {
                product,
                inserted_at: Utc::now(),
            },
        );
        self.order.push_back(url.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, url: &str) {
        self.entries.remove(url);
        self.order.retain(|k| k != url);
    }
}
