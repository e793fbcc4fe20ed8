//! Last-known-good parking records with a freshness window.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parkwatch_core::ParkingRecord;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::store::KvStore;

/// Storage key for the single cache slot.
pub const CACHE_KEY: &str = "parking-cache";

/// Persisted cache layout: the normalized records and the write time in
/// epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Vec<ParkingRecord>,
    pub timestamp: i64,
}

/// A fresh cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRecords {
    pub records: Vec<ParkingRecord>,
    /// Age of the entry at read time.
    pub age_ms: i64,
}

/// Single-slot cache over a [`KvStore`].
///
/// Storage failures never escape: a failed write is logged and a failed or
/// corrupt read is a miss.
pub struct LocalCache<S> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S> Clone for LocalCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
        }
    }
}

impl<S: KvStore> LocalCache<S> {
    pub fn new(store: Arc<S>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replace the cache slot with `records`, stamped now.
    pub fn store(&self, records: &[ParkingRecord]) {
        self.store_at(records, Utc::now().timestamp_millis());
    }

    pub fn store_at(&self, records: &[ParkingRecord], now_ms: i64) {
        if let Err(e) = self.try_store(records, now_ms) {
            tracing::warn!(stage = "cache", error = %e, "cache write failed");
        }
    }

    fn try_store(&self, records: &[ParkingRecord], now_ms: i64) -> Result<(), StorageError> {
        let entry = CacheEntry {
            data: records.to_vec(),
            timestamp: now_ms,
        };
        let text = serde_json::to_string(&entry)?;
        self.store.set(CACHE_KEY, &text)
    }

    /// Read the slot if it is younger than the TTL.
    #[must_use]
    pub fn load(&self) -> Option<CachedRecords> {
        self.load_at(Utc::now().timestamp_millis())
    }

    /// Read the slot as of `now_ms`.
    #[must_use]
    pub fn load_at(&self, now_ms: i64) -> Option<CachedRecords> {
        let text = match self.store.get(CACHE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(stage = "cache", error = %e, "cache read failed");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&text) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(stage = "cache", error = %e, "cache entry is corrupt; ignoring");
                return None;
            }
        };

        let age_ms = now_ms.saturating_sub(entry.timestamp);
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms < 0 || age_ms >= ttl_ms {
            tracing::debug!(stage = "cache", age_ms, ttl_ms, "cache entry is stale");
            return None;
        }

        Some(CachedRecords {
            records: entry.data,
            age_ms,
        })
    }
}
