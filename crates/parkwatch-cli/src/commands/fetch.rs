use clap::Args;
use parkwatch_core::{
    aggregate, filter_available_only, filter_by_substring, rank, AppConfig, FacilitySummary,
    FavoriteSet,
};
use parkwatch_feed::{AcquireMode, DataOrigin};
use serde::Serialize;

use super::{build_pipeline, favorite_store, LocationArgs};

#[derive(Debug, Args)]
pub(crate) struct FetchArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Keep only facilities whose name or address contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Keep only facilities with a free regular space
    #[arg(long)]
    pub available_only: bool,

    /// Skip the cache fallback when every source fails
    #[arg(long)]
    pub refresh: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct FacilityOutput<'a> {
    #[serde(flatten)]
    summary: &'a FacilitySummary,
    favorite: bool,
}

/// Acquire once, then aggregate, rank, filter and print.
///
/// # Errors
///
/// Returns an error if the source chain or favorites cannot be loaded, or
/// JSON output cannot be serialized.
pub(crate) async fn run_fetch(config: &AppConfig, args: &FetchArgs) -> anyhow::Result<()> {
    let (lat, lon) = args.location.resolve(config)?;
    let favorites = favorite_store(config)?.load();
    let mut pipeline = build_pipeline(config)?;

    let mode = if args.refresh {
        AcquireMode::Refresh
    } else {
        AcquireMode::Normal
    };
    let acquisition = pipeline.acquire_with(lat, lon, mode).await;
    match &acquisition.origin {
        DataOrigin::Live { adapter } => tracing::info!(adapter = %adapter, "live data"),
        DataOrigin::Cache { age_ms } => {
            eprintln!("warning: all sources failed; showing cached data ({}s old)", age_ms / 1000);
        }
        DataOrigin::Empty => eprintln!("warning: all sources failed and no fresh cache is available"),
    }

    let summaries = select(
        rank(aggregate(&acquisition.records), &favorites),
        args.search.as_deref(),
        args.available_only,
    );

    if args.json {
        let output: Vec<FacilityOutput<'_>> = summaries
            .iter()
            .map(|summary| FacilityOutput {
                summary,
                favorite: favorites.contains(&summary.name),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(&summaries, &favorites);
    }
    Ok(())
}

fn select(
    summaries: Vec<FacilitySummary>,
    search: Option<&str>,
    available_only: bool,
) -> Vec<FacilitySummary> {
    let mut summaries = match search {
        Some(text) => filter_by_substring(&summaries, text),
        None => summaries,
    };
    if available_only {
        summaries = filter_available_only(&summaries);
    }
    summaries
}

fn print_table(summaries: &[FacilitySummary], favorites: &FavoriteSet) {
    if summaries.is_empty() {
        println!("no parking facilities found");
        return;
    }
    println!("   {:<32} {:>9} {:>10}  {}", "NAME", "REGULAR", "ACCESSIBLE", "FEE");
    for summary in summaries {
        println!("{}", format_row(summary, favorites.contains(&summary.name)));
    }
}

pub(crate) fn format_row(summary: &FacilitySummary, favorite: bool) -> String {
    let marker = if favorite { '*' } else { ' ' };
    let regular = format!("{}/{}", summary.regular_available, summary.regular_total);
    let accessible = format!("{}/{}", summary.accessible_available, summary.accessible_total);
    format!(
        "{marker}  {:<32} {regular:>9} {accessible:>10}  {}",
        summary.name,
        summary.weekday_fee.as_deref().unwrap_or("-"),
    )
}
