//! Upstream source chain configuration.
//!
//! The chain is an ordered list: the acquisition pipeline tries entries top
//! to bottom and stops at the first transport success. Operators can replace
//! the built-in chain with a YAML file (see `config/sources.example.yaml`).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const TAIPEI_POI_URL: &str = "https://itaipeiparking.pma.gov.taipei/MapAPI/GetAllPOIData";
const TAIPEI_TOKEN_URL: &str = "https://itaipeiparking.pma.gov.taipei/MapAPI/GetToken";
const TAIPEI_PARKS_URL: &str = "https://itaipeiparking.pma.gov.taipei/MapAPI/GetParks";

/// Known upstream payload shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// `GetAllPOIData`: one object per space with stringified `lat`/`lon`,
    /// a textual `remark` and a numeric `dataType`.
    LegacyPoi,
    /// `GetParks` range query: one object per lot with `latitude`/`longitude`,
    /// `availableSpaces` and `distance`.
    RangeQuery,
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadFormat::LegacyPoi => write!(f, "legacy_poi"),
            PayloadFormat::RangeQuery => write!(f, "range_query"),
        }
    }
}

/// How a proxy carries the upstream request and response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyWrapping {
    /// `proxy_url` + target URL; request and response pass through verbatim.
    Prefix,
    /// `proxy_url` + percent-encoded target URL (with query string); the
    /// response is wrapped as `{"contents": "<json-string>"}`.
    Envelope,
}

/// One entry of the source chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    Direct {
        name: String,
        url: String,
        format: PayloadFormat,
    },
    Proxy {
        name: String,
        proxy_url: String,
        target_url: String,
        wrapping: ProxyWrapping,
        format: PayloadFormat,
    },
    Session {
        name: String,
        token_url: String,
        data_url: String,
        format: PayloadFormat,
    },
}

impl SourceSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SourceSpec::Direct { name, .. }
            | SourceSpec::Proxy { name, .. }
            | SourceSpec::Session { name, .. } => name,
        }
    }

    #[must_use]
    pub fn format(&self) -> PayloadFormat {
        match self {
            SourceSpec::Direct { format, .. }
            | SourceSpec::Proxy { format, .. }
            | SourceSpec::Session { format, .. } => *format,
        }
    }

    fn urls(&self) -> Vec<&str> {
        match self {
            SourceSpec::Direct { url, .. } => vec![url.as_str()],
            SourceSpec::Proxy {
                proxy_url,
                target_url,
                ..
            } => vec![proxy_url.as_str(), target_url.as_str()],
            SourceSpec::Session {
                token_url,
                data_url,
                ..
            } => vec![token_url.as_str(), data_url.as_str()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceSpec>,
}

/// The chain used when no sources file is configured.
///
/// Direct access first, then the two public CORS proxies, then the
/// token-bootstrapped `GetParks` endpoint.
#[must_use]
pub fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::Direct {
            name: "direct".to_string(),
            url: TAIPEI_POI_URL.to_string(),
            format: PayloadFormat::LegacyPoi,
        },
        SourceSpec::Proxy {
            name: "corsproxy".to_string(),
            proxy_url: "https://corsproxy.io/?url=".to_string(),
            target_url: TAIPEI_POI_URL.to_string(),
            wrapping: ProxyWrapping::Prefix,
            format: PayloadFormat::LegacyPoi,
        },
        SourceSpec::Proxy {
            name: "allorigins".to_string(),
            proxy_url: "https://api.allorigins.win/get?url=".to_string(),
            target_url: TAIPEI_POI_URL.to_string(),
            wrapping: ProxyWrapping::Envelope,
            format: PayloadFormat::LegacyPoi,
        },
        SourceSpec::Session {
            name: "getparks-session".to_string(),
            token_url: TAIPEI_TOKEN_URL.to_string(),
            data_url: TAIPEI_PARKS_URL.to_string(),
            format: PayloadFormat::RangeQuery,
        },
    ]
}

/// Load and validate a source chain from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<Vec<SourceSpec>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: SourcesFile = serde_yaml::from_str(&content)?;
    validate_sources(&file.sources)?;
    Ok(file.sources)
}

fn validate_sources(sources: &[SourceSpec]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "source chain must contain at least one entry".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in sources {
        let name = source.name().trim();
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{name}'"
            )));
        }
        for url in source.urls() {
            let url = url.trim();
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::Validation(format!(
                    "source '{name}' has non-http URL '{url}'"
                )));
            }
        }
    }

    Ok(())
}
