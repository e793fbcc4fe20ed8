use thiserror::Error;

/// Failure to obtain a payload from one upstream source.
///
/// Every variant is recoverable: the pipeline logs it and moves on to the
/// next source in the chain.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} is not JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("session bootstrap against {url} failed: {reason}")]
    Bootstrap { url: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    /// Short label used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Http(e) if e.is_timeout() => "timeout",
            TransportError::Http(e) if e.is_connect() => "connect",
            TransportError::Http(_) => "network",
            TransportError::UnexpectedStatus { .. } => "status",
            TransportError::InvalidJson { .. } => "invalid_json",
            TransportError::EmptyBody { .. } => "empty_body",
            TransportError::Bootstrap { .. } => "bootstrap",
            TransportError::InvalidUrl { .. } => "invalid_url",
        }
    }
}

/// A payload arrived but its shape is not one the normalizer understands.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("expected a JSON array of records, found {found}")]
    NotAList { found: &'static str },

    #[error("proxy envelope `contents` is not a string")]
    EnvelopeNotString,

    #[error("proxy envelope `contents` is not valid JSON: {0}")]
    EnvelopeDecode(#[source] serde_json::Error),
}

/// Persisted key-value storage failure. Callers treat it as a cache miss.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}
