//! Upstream transports.
//!
//! Each adapter knows how to reach the parking API one way (directly,
//! through a CORS proxy, or behind a session token) and returns whatever
//! JSON came back. Shape checking is left to [`crate::normalize`].

mod direct;
mod proxy;
mod session;

use parkwatch_core::{PayloadFormat, SourceSpec};

use crate::error::TransportError;

pub use direct::DirectSource;
pub use proxy::ProxySource;
pub use session::SessionSource;

/// Search radius sent to range-query endpoints, in meters.
pub const RANGE_QUERY_RADIUS_METERS: u32 = 1_000;

/// An upstream payload exactly as one adapter received it.
#[derive(Debug, Clone)]
pub struct RawPayload {
    /// Name of the adapter that produced the payload.
    pub source: String,
    pub format: PayloadFormat,
    pub body: serde_json::Value,
}

/// One configured entry of the source chain.
#[derive(Debug)]
pub enum SourceAdapter {
    Direct(DirectSource),
    Proxy(ProxySource),
    Session(SessionSource),
}

impl SourceAdapter {
    #[must_use]
    pub fn from_spec(spec: &SourceSpec) -> Self {
        match spec {
            SourceSpec::Direct { name, url, format } => {
                SourceAdapter::Direct(DirectSource::new(name, url, *format))
            }
            SourceSpec::Proxy {
                name,
                proxy_url,
                target_url,
                wrapping,
                format,
            } => SourceAdapter::Proxy(ProxySource::new(
                name, proxy_url, target_url, *wrapping, *format,
            )),
            SourceSpec::Session {
                name,
                token_url,
                data_url,
                format,
            } => SourceAdapter::Session(SessionSource::new(name, token_url, data_url, *format)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SourceAdapter::Direct(s) => &s.name,
            SourceAdapter::Proxy(s) => &s.name,
            SourceAdapter::Session(s) => &s.name,
        }
    }

    #[must_use]
    pub fn format(&self) -> PayloadFormat {
        match self {
            SourceAdapter::Direct(s) => s.format,
            SourceAdapter::Proxy(s) => s.format,
            SourceAdapter::Session(s) => s.format,
        }
    }

    /// Request parking data around `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on network failure, non-2xx status,
    /// a non-JSON or empty body, or a failed session bootstrap.
    pub async fn fetch(
        &self,
        client: &reqwest::Client,
        lat: f64,
        lon: f64,
    ) -> Result<RawPayload, TransportError> {
        let body = match self {
            SourceAdapter::Direct(s) => s.fetch(client, lat, lon).await?,
            SourceAdapter::Proxy(s) => s.fetch(client, lat, lon).await?,
            SourceAdapter::Session(s) => s.fetch(client, lat, lon).await?,
        };
        Ok(RawPayload {
            source: self.name().to_string(),
            format: self.format(),
            body,
        })
    }
}

/// Build adapters for a source chain, preserving its order.
#[must_use]
pub fn build_adapters(specs: &[SourceSpec]) -> Vec<SourceAdapter> {
    specs.iter().map(SourceAdapter::from_spec).collect()
}

/// Form fields the upstream expects for a query around `(lat, lon)`.
///
/// The legacy endpoint's `catagory` spelling is what the server accepts.
pub(crate) fn query_fields(format: PayloadFormat, lat: f64, lon: f64) -> Vec<(&'static str, String)> {
    match format {
        PayloadFormat::LegacyPoi => vec![
            ("lon", lon.to_string()),
            ("lat", lat.to_string()),
            ("catagory", "car".to_string()),
            ("type", "1".to_string()),
        ],
        PayloadFormat::RangeQuery => vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("range", RANGE_QUERY_RADIUS_METERS.to_string()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkwatch_core::default_sources;

    #[test]
    fn builds_adapters_in_chain_order() {
        let adapters = build_adapters(&default_sources());
        let names: Vec<&str> = adapters.iter().map(SourceAdapter::name).collect();
        assert_eq!(
            names,
            ["direct", "corsproxy", "allorigins", "getparks-session"]
        );
        assert!(matches!(adapters[3], SourceAdapter::Session(_)));
        assert_eq!(adapters[3].format(), PayloadFormat::RangeQuery);
    }

    #[test]
    fn legacy_query_fields_match_upstream_form() {
        let fields = query_fields(PayloadFormat::LegacyPoi, 25.03, 121.5);
        assert_eq!(
            fields,
            vec![
                ("lon", "121.5".to_string()),
                ("lat", "25.03".to_string()),
                ("catagory", "car".to_string()),
                ("type", "1".to_string()),
            ]
        );
    }

    #[test]
    fn range_query_fields_include_radius() {
        let fields = query_fields(PayloadFormat::RangeQuery, 25.03, 121.5);
        assert!(fields.contains(&("range", "1000".to_string())));
    }
}
