use parkwatch_core::PayloadFormat;

use super::query_fields;
use crate::error::TransportError;
use crate::fetch::send_json;

/// POSTs the query form straight to the upstream endpoint.
#[derive(Debug)]
pub struct DirectSource {
    pub(super) name: String,
    url: String,
    pub(super) format: PayloadFormat,
}

impl DirectSource {
    pub(super) fn new(name: &str, url: &str, format: PayloadFormat) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            format,
        }
    }

    pub(super) async fn fetch(
        &self,
        client: &reqwest::Client,
        lat: f64,
        lon: f64,
    ) -> Result<serde_json::Value, TransportError> {
        tracing::debug!(adapter = %self.name, url = %self.url, "direct request");
        let request = client
            .post(&self.url)
            .form(&query_fields(self.format, lat, lon));
        send_json(request, &self.url).await
    }
}
