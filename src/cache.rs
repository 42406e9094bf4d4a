use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use crate::book::Book;

/// Cached search result with its creation time (epoch milliseconds).
/// Entries are never evicted proactively; a stale entry is ignored on read
/// and superseded by the next successful fetch.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<Book>,
    timestamp: i64,
}

/// TTL keyed in-memory store wrapping adapter calls. The TTL is a per-call
/// parameter so call sites (general search vs. free-books aggregate) choose
/// their own freshness window. Concurrent misses for the same key are not
/// coalesced; the redundant fetches are harmless.
#[derive(Default)]
pub struct SearchCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key convention: `source|normalized query|limit`.
    pub fn key(source: &str, query: &str, limit: usize) -> String {
        format!("{}|{}|{}", source, norm_query(query), limit)
    }

    pub fn get(&self, key: &str, ttl: Duration) -> Option<Vec<Book>> {
        let now = current_epoch_ms();
        let map = self.entries.lock().expect("cache lock poisoned");
        map.get(key)
            .filter(|e| now - e.timestamp < ttl.as_millis() as i64)
            .map(|e| e.data.clone())
    }

    pub fn put(&self, key: &str, data: Vec<Book>) {
        let entry = CacheEntry {
            data,
            timestamp: current_epoch_ms(),
        };
        let mut map = self.entries.lock().expect("cache lock poisoned");
        map.insert(key.to_string(), entry);
    }

    /// Return a fresh entry verbatim, or invoke `fetch` and store its result
    /// under the key with a new timestamp. The lock is never held across the
    /// fetch await.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Vec<Book>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Book>>,
    {
        if let Some(hit) = self.get(key, ttl) {
            tracing::debug!(key, "cache hit");
            return hit;
        }
        let data = fetch().await;
        self.put(key, data.clone());
        data
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collapse whitespace runs and lowercase, so logically identical queries
/// share a cache entry.
pub fn norm_query(q: &str) -> String {
    let trimmed = q.trim().to_lowercase();
    let mut out = String::with_capacity(trimmed.len());
    let mut last_space = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    out
}

fn current_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
