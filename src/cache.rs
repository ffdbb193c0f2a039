use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// Time-boxed store of raw response bodies keyed by URL plus request options.
///
/// Entries are served until they expire, even if the backend has changed in
/// the meantime. The `*_at` variants take the current instant explicitly.
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

/// Cache handle shared between the client and background loaders.
pub type SharedCache = Arc<Mutex<ResponseCache>>;

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn shared(ttl: Duration) -> SharedCache {
        Arc::new(Mutex::new(Self::new(ttl)))
    }

    /// Cache key for a GET: the URL followed by the sorted option pairs.
    pub fn key(url: &str, options: &[(&str, &str)]) -> String {
        let mut opts: Vec<String> = options.iter().map(|(k, v)| format!("{k}={v}")).collect();
        opts.sort();
        if opts.is_empty() {
            url.to_string()
        } else {
            format!("{url}?{}", opts.join("&"))
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|e| now < e.expires_at)
            .map(|e| e.body.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.has_at(key, Instant::now())
    }

    pub fn has_at(&self, key: &str, now: Instant) -> bool {
        self.get_at(key, now).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, body: impl Into<String>) {
        self.set_at(key, body, Instant::now());
    }

    pub fn set_at(&mut self, key: impl Into<String>, body: impl Into<String>, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                body: body.into(),
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| now < e.expires_at);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
