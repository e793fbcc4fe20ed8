pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod favorites;
pub mod rank;
pub mod sources;
pub mod types;

pub use aggregate::{aggregate, UNNAMED_PREFIX};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use favorites::FavoriteSet;
pub use rank::{filter_available_only, filter_available_records, filter_by_substring, rank};
pub use sources::{
    default_sources, load_sources, PayloadFormat, ProxyWrapping, SourceSpec, SourcesFile,
};
pub use types::{Coordinate, FacilitySummary, Occupancy, ParkingRecord};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),
}
