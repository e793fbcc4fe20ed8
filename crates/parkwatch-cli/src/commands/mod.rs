//! Command handlers for the CLI.
//!
//! Each handler builds what it needs from [`AppConfig`]; acquisition never
//! fails, so only configuration and storage errors are propagated.

mod favorites;
mod fetch;
mod watch;

use std::sync::Arc;

use clap::Args;
use parkwatch_core::{AppConfig, SourceSpec};
use parkwatch_feed::{FavoriteStore, FileStore, Pipeline};

pub(crate) use favorites::{run_favorites, FavoritesCommands};
pub(crate) use fetch::{run_fetch, FetchArgs};
pub(crate) use watch::{run_watch, WatchArgs};

/// Coordinate flags shared by `fetch` and `watch`; both or neither.
#[derive(Debug, Args)]
pub(crate) struct LocationArgs {
    /// Latitude to search around (defaults to `PARKWATCH_DEFAULT_LAT`)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to search around (defaults to `PARKWATCH_DEFAULT_LON`)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    pub(crate) fn resolve(&self, config: &AppConfig) -> anyhow::Result<(f64, f64)> {
        let lat = self.lat.unwrap_or(config.default_lat);
        let lon = self.lon.unwrap_or(config.default_lon);
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            anyhow::bail!("coordinate ({lat}, {lon}) is out of range");
        }
        Ok((lat, lon))
    }
}

fn load_source_chain(config: &AppConfig) -> anyhow::Result<Vec<SourceSpec>> {
    Ok(match &config.sources_path {
        Some(path) => parkwatch_core::load_sources(path)?,
        None => parkwatch_core::default_sources(),
    })
}

pub(crate) fn build_pipeline(config: &AppConfig) -> anyhow::Result<Pipeline<FileStore>> {
    let sources = load_source_chain(config)?;
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let pipeline = Pipeline::from_config(config, &sources, store)?;
    tracing::debug!(sources = ?pipeline.source_names(), "pipeline ready");
    Ok(pipeline)
}

pub(crate) fn favorite_store(config: &AppConfig) -> anyhow::Result<FavoriteStore<FileStore>> {
    let favorites = FavoriteStore::new(Arc::new(FileStore::new(config.data_dir.clone())));
    favorites.ensure_initialized()?;
    Ok(favorites)
}
