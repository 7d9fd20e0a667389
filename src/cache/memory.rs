// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process LRU session cache with per-entry TTL.
//!
//! Capacity bounds memory; when full, the least recently used session is
//! evicted, which has the same effect for its owner as expiry. Expired
//! entries are dropped lazily on `get` and by the background sweep in
//! [`LruSessionCache::run_purge`].

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{CacheError, SessionCache};

/// Cached value + expiry instant.
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

pub struct LruSessionCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
}

impl LruSessionCache {
    /// Create a new cache holding at most `capacity` sessions.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut cache) = self.cache.lock() else {
            return 0;
        };
        let now = Instant::now();
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            cache.pop(key);
        }
        expired.len()
    }

    /// Sweep expired sessions every `interval` until `shutdown` is cancelled.
    ///
    /// ```rust,ignore
    /// tokio::spawn(cache.clone().run_purge(interval, shutdown.clone()));
    /// ```
    pub async fn run_purge(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) {
        info!(interval_secs = interval.as_secs(), "Session cache sweeper starting");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let purged = self.purge_expired();
                    if purged > 0 {
                        debug!(purged, "Expired sessions purged");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Session cache sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Drop every entry. Returns how many were held.
    pub fn clear(&self) -> usize {
        let Ok(mut cache) = self.cache.lock() else {
            return 0;
        };
        let held = cache.len();
        cache.clear();
        held
    }
}

#[async_trait]
impl SessionCache for LruSessionCache {
    async fn save(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| CacheError::Unavailable("session cache lock poisoned".to_string()))?;
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::InvalidValue(format!("ttl out of range: {ttl:?}")))?;
        cache.put(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| CacheError::Unavailable("session cache lock poisoned".to_string()))?;
        if let Some(entry) = cache.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(entry.value.clone());
            }
            // Expired
            cache.pop(key);
        }
        Err(CacheError::NotFound)
    }
}
