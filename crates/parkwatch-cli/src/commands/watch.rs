use std::time::Duration;

use clap::Args;
use parkwatch_core::{aggregate, rank, AppConfig};
use parkwatch_feed::DataOrigin;

use super::fetch::format_row;
use super::{build_pipeline, favorite_store, LocationArgs};

#[derive(Debug, Args)]
pub(crate) struct WatchArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Seconds between polls (defaults to `PARKWATCH_REFRESH_INTERVAL_SECS`)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

/// Poll until ctrl-c, printing the ranked facilities each cycle.
///
/// A cycle whose sources all fail prints whatever the cache or an empty
/// result yields and the loop carries on; the next tick retries.
///
/// # Errors
///
/// Returns an error if the source chain or favorites cannot be loaded.
pub(crate) async fn run_watch(config: &AppConfig, args: &WatchArgs) -> anyhow::Result<()> {
    let (lat, lon) = args.location.resolve(config)?;
    let favorites = favorite_store(config)?;
    let mut pipeline = build_pipeline(config)?;
    let every = Duration::from_secs(args.interval.unwrap_or(config.refresh_interval_secs));

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tracing::info!(lat, lon, interval_secs = every.as_secs(), "watching parking availability");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received ctrl-c, stopping");
                return Ok(());
            }
        }

        let acquisition = pipeline
            .acquire_with(lat, lon, parkwatch_feed::AcquireMode::Normal)
            .await;
        let favorite_set = favorites.load();
        let summaries = rank(aggregate(&acquisition.records), &favorite_set);

        let origin = match &acquisition.origin {
            DataOrigin::Live { adapter } => format!("live via {adapter}"),
            DataOrigin::Cache { age_ms } => format!("cached, {}s old", age_ms / 1000),
            DataOrigin::Empty => "no data".to_string(),
        };
        println!("--- {} facilities ({origin}) ---", summaries.len());
        for summary in &summaries {
            println!("{}", format_row(summary, favorite_set.contains(&summary.name)));
        }
    }
}
