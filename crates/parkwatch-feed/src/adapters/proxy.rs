use parkwatch_core::{PayloadFormat, ProxyWrapping};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Url;

use super::query_fields;
use crate::error::TransportError;
use crate::fetch::send_json;

/// Reaches the upstream through a third-party CORS proxy.
#[derive(Debug)]
pub struct ProxySource {
    pub(super) name: String,
    proxy_url: String,
    target_url: String,
    wrapping: ProxyWrapping,
    pub(super) format: PayloadFormat,
}

impl ProxySource {
    pub(super) fn new(
        name: &str,
        proxy_url: &str,
        target_url: &str,
        wrapping: ProxyWrapping,
        format: PayloadFormat,
    ) -> Self {
        Self {
            name: name.to_string(),
            proxy_url: proxy_url.to_string(),
            target_url: target_url.to_string(),
            wrapping,
            format,
        }
    }

    pub(super) async fn fetch(
        &self,
        client: &reqwest::Client,
        lat: f64,
        lon: f64,
    ) -> Result<serde_json::Value, TransportError> {
        let fields = query_fields(self.format, lat, lon);
        match self.wrapping {
            ProxyWrapping::Prefix => {
                let url = format!("{}{}", self.proxy_url, self.target_url);
                tracing::debug!(adapter = %self.name, url = %url, "prefix proxy request");
                send_json(client.post(&url).form(&fields), &url).await
            }
            ProxyWrapping::Envelope => {
                let url = self.envelope_url(&fields)?;
                tracing::debug!(adapter = %self.name, url = %url, "envelope proxy request");
                send_json(client.get(&url), &url).await
            }
        }
    }

    /// Envelope proxies only relay GETs, so the form travels in the target's
    /// query string and the whole target is percent-encoded into the proxy URL.
    fn envelope_url(&self, fields: &[(&'static str, String)]) -> Result<String, TransportError> {
        let mut target = Url::parse(&self.target_url).map_err(|e| TransportError::InvalidUrl {
            url: self.target_url.clone(),
            reason: e.to_string(),
        })?;
        {
            let mut pairs = target.query_pairs_mut();
            for (key, value) in fields {
                pairs.append_pair(key, value);
            }
        }
        let encoded = utf8_percent_encode(target.as_str(), NON_ALPHANUMERIC);
        Ok(format!("{}{encoded}", self.proxy_url))
    }
}
