//! Resilient acquisition of live parking availability.
//!
//! A [`Pipeline`] walks an ordered chain of [`SourceAdapter`]s, normalizes
//! the first payload it gets back into [`parkwatch_core::ParkingRecord`]s and
//! falls back to a time-boxed [`LocalCache`] when every source fails.

pub mod adapters;
pub mod cache;
pub mod error;
pub(crate) mod fetch;
pub mod favorites;
pub mod normalize;
pub mod pipeline;
pub mod store;

pub use adapters::{build_adapters, RawPayload, SourceAdapter};
pub use cache::{CacheEntry, CachedRecords, LocalCache, CACHE_KEY};
pub use error::{FormatError, StorageError, TransportError};
pub use favorites::{FavoriteStore, FAVORITES_KEY};
pub use normalize::{normalize, try_normalize};
pub use pipeline::{AcquireMode, Acquisition, DataOrigin, Pipeline};
pub use store::{FileStore, KvStore, MemoryStore};
