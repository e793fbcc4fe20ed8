use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Directory backing the persisted key-value store (cache + favorites).
    pub data_dir: PathBuf,
    /// Optional YAML file overriding the built-in source chain.
    pub sources_path: Option<PathBuf>,
    pub default_lat: f64,
    pub default_lon: f64,
    pub refresh_interval_secs: u64,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}
