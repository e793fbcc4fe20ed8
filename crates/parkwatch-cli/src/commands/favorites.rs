use clap::Subcommand;
use parkwatch_core::AppConfig;

use super::favorite_store;

/// Sub-commands available under `favorites`.
#[derive(Debug, Subcommand)]
pub(crate) enum FavoritesCommands {
    /// Print favorite facility names in insertion order
    List,
    /// Star a facility by name
    Add { name: String },
    /// Unstar a facility by name
    Remove { name: String },
}

/// # Errors
///
/// Returns an error if the favorites list cannot be read or written.
pub(crate) fn run_favorites(config: &AppConfig, command: &FavoritesCommands) -> anyhow::Result<()> {
    let favorites = favorite_store(config)?;
    match command {
        FavoritesCommands::List => {
            let set = favorites.load();
            if set.is_empty() {
                println!("no favorites yet");
            }
            for name in set.names() {
                println!("{name}");
            }
        }
        FavoritesCommands::Add { name } => {
            let name = non_blank(name)?;
            if favorites.add(name)? {
                println!("added \"{name}\"");
            } else {
                println!("\"{name}\" is already a favorite");
            }
        }
        FavoritesCommands::Remove { name } => {
            let name = non_blank(name)?;
            if favorites.remove(name)? {
                println!("removed \"{name}\"");
            } else {
                println!("\"{name}\" was not a favorite");
            }
        }
    }
    Ok(())
}

fn non_blank(name: &str) -> anyhow::Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        anyhow::bail!("favorite name must not be blank");
    }
    Ok(trimmed)
}
