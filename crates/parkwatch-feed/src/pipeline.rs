//! Fallback orchestration: try each source in order, fall back to the
//! cache, never fail.

use std::sync::Arc;
use std::time::Duration;

use parkwatch_core::{aggregate, rank, AppConfig, FacilitySummary, FavoriteSet, ParkingRecord, SourceSpec};

use crate::adapters::{build_adapters, SourceAdapter};
use crate::cache::{CachedRecords, LocalCache};
use crate::error::TransportError;
use crate::normalize::try_normalize;
use crate::store::KvStore;

/// Whether a total live failure may be answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireMode {
    /// Live chain, then a fresh cache entry, then empty.
    Normal,
    /// Live chain, then empty. Used when the caller asked for fresh data.
    Refresh,
}

/// Where an acquisition's records came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Live { adapter: String },
    Cache { age_ms: i64 },
    Empty,
}

/// Records plus their provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub records: Vec<ParkingRecord>,
    pub origin: DataOrigin,
}

impl Acquisition {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            origin: DataOrigin::Empty,
        }
    }
}

/// Owns the source chain, the HTTP client, the cache and the last result.
///
/// Acquisition takes `&mut self`: one acquisition is in flight per
/// pipeline, and callers sharing a pipeline must serialize access.
pub struct Pipeline<S> {
    client: reqwest::Client,
    adapters: Vec<SourceAdapter>,
    cache: LocalCache<S>,
    last: Option<Acquisition>,
}

impl<S: KvStore + 'static> Pipeline<S> {
    pub fn new(client: reqwest::Client, adapters: Vec<SourceAdapter>, cache: LocalCache<S>) -> Self {
        Self {
            client,
            adapters,
            cache,
            last: None,
        }
    }

    /// Build a pipeline from application config and a source chain.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        sources: &[SourceSpec],
        store: Arc<S>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs.min(10)))
            .user_agent(config.user_agent.clone())
            .build()?;
        let cache = LocalCache::new(store, Duration::from_secs(config.cache_ttl_secs));
        Ok(Self::new(client, build_adapters(sources), cache))
    }

    /// Names of the configured sources, in try order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.adapters.iter().map(SourceAdapter::name).collect()
    }

    /// Records around `(lat, lon)`: live if any source answers, otherwise a
    /// fresh cache entry, otherwise empty.
    pub async fn acquire(&mut self, lat: f64, lon: f64) -> Vec<ParkingRecord> {
        self.acquire_with(lat, lon, AcquireMode::Normal).await.records
    }

    /// Like [`Pipeline::acquire`] but never answers from the cache.
    pub async fn refresh(&mut self, lat: f64, lon: f64) -> Vec<ParkingRecord> {
        self.acquire_with(lat, lon, AcquireMode::Refresh).await.records
    }

    /// Acquire and report where the records came from.
    pub async fn acquire_with(&mut self, lat: f64, lon: f64, mode: AcquireMode) -> Acquisition {
        let acquisition = self.run_chain(lat, lon, mode).await;
        self.last = Some(acquisition.clone());
        acquisition
    }

    /// Acquire, aggregate per facility, and rank with `favorites`.
    pub async fn acquire_summaries(
        &mut self,
        lat: f64,
        lon: f64,
        favorites: &FavoriteSet,
    ) -> Vec<FacilitySummary> {
        let records = self.acquire(lat, lon).await;
        rank(aggregate(&records), favorites)
    }

    /// The most recent acquisition, if any has run.
    #[must_use]
    pub fn last(&self) -> Option<&Acquisition> {
        self.last.as_ref()
    }

    /// Records of the most recent acquisition; empty before the first.
    #[must_use]
    pub fn last_records(&self) -> &[ParkingRecord] {
        self.last.as_ref().map_or(&[], |a| a.records.as_slice())
    }

    async fn run_chain(&self, lat: f64, lon: f64, mode: AcquireMode) -> Acquisition {
        for (attempt, adapter) in self.adapters.iter().enumerate() {
            let started = std::time::Instant::now();
            match adapter.fetch(&self.client, lat, lon).await {
                Ok(payload) => {
                    // A rejected shape still ends the chain, but must not
                    // overwrite the last good cache entry.
                    let records = match try_normalize(&payload.body, payload.format) {
                        Ok(records) => {
                            self.store_cache(records.clone()).await;
                            records
                        }
                        Err(e) => {
                            tracing::warn!(
                                adapter = adapter.name(),
                                stage = "normalize",
                                format = %payload.format,
                                error = %e,
                                "unrecognised payload shape; treating as empty, cache untouched"
                            );
                            Vec::new()
                        }
                    };
                    tracing::info!(
                        adapter = adapter.name(),
                        attempt = attempt + 1,
                        records = records.len(),
                        elapsed = ?started.elapsed(),
                        "source succeeded"
                    );
                    return Acquisition {
                        records,
                        origin: DataOrigin::Live {
                            adapter: adapter.name().to_string(),
                        },
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        adapter = adapter.name(),
                        attempt = attempt + 1,
                        kind = e.kind(),
                        error = %e,
                        elapsed = ?started.elapsed(),
                        "source failed; trying next"
                    );
                }
            }
        }

        if mode == AcquireMode::Refresh {
            tracing::warn!(stage = "acquire", "all sources failed during refresh; returning empty");
            return Acquisition::empty();
        }

        match self.load_cache().await {
            Some(hit) => {
                tracing::warn!(
                    stage = "acquire",
                    age_ms = hit.age_ms,
                    records = hit.records.len(),
                    "all sources failed; serving cached records"
                );
                Acquisition {
                    records: hit.records,
                    origin: DataOrigin::Cache { age_ms: hit.age_ms },
                }
            }
            None => {
                tracing::warn!(stage = "acquire", "all sources failed and no fresh cache; returning empty");
                Acquisition::empty()
            }
        }
    }

    // The store may touch the filesystem, so cache I/O runs off the async
    // worker threads.
    async fn store_cache(&self, records: Vec<ParkingRecord>) {
        let cache = self.cache.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || cache.store(&records)).await {
            tracing::warn!(stage = "cache", error = %e, "cache write task failed");
        }
    }

    async fn load_cache(&self) -> Option<CachedRecords> {
        let cache = self.cache.clone();
        match tokio::task::spawn_blocking(move || cache.load()).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(stage = "cache", error = %e, "cache read task failed");
                None
            }
        }
    }
}
