use std::sync::{Mutex, PoisonError};

use parkwatch_core::PayloadFormat;

use super::query_fields;
use crate::error::TransportError;
use crate::fetch::{send_json, send_json_authorized};

const TOKEN_KEYS: [&str; 4] = ["token", "access_token", "accessToken", "Token"];

/// Fetches from an endpoint that requires a bearer token obtained from a
/// separate bootstrap call.
///
/// The token is cached between calls. A 401/403 from the data endpoint drops
/// the cached token and bootstraps once more before giving up.
#[derive(Debug)]
pub struct SessionSource {
    pub(super) name: String,
    token_url: String,
    data_url: String,
    pub(super) format: PayloadFormat,
    token: Mutex<Option<String>>,
}

impl SessionSource {
    pub(super) fn new(name: &str, token_url: &str, data_url: &str, format: PayloadFormat) -> Self {
        Self {
            name: name.to_string(),
            token_url: token_url.to_string(),
            data_url: data_url.to_string(),
            format,
            token: Mutex::new(None),
        }
    }

    pub(super) async fn fetch(
        &self,
        client: &reqwest::Client,
        lat: f64,
        lon: f64,
    ) -> Result<serde_json::Value, TransportError> {
        let (token, reused) = match self.cached_token() {
            Some(token) => (token, true),
            None => (self.bootstrap(client).await?, false),
        };

        if let Some(body) = self.request(client, &token, lat, lon).await? {
            return Ok(body);
        }

        self.clear_token();
        if !reused {
            return Err(self.rejected());
        }

        tracing::info!(adapter = %self.name, "session token rejected; re-bootstrapping");
        let token = self.bootstrap(client).await?;
        match self.request(client, &token, lat, lon).await? {
            Some(body) => Ok(body),
            None => {
                self.clear_token();
                Err(self.rejected())
            }
        }
    }

    async fn bootstrap(&self, client: &reqwest::Client) -> Result<String, TransportError> {
        tracing::debug!(adapter = %self.name, url = %self.token_url, "bootstrapping session token");
        let body = send_json(client.get(&self.token_url), &self.token_url).await?;
        let token = extract_token(&body).ok_or_else(|| TransportError::Bootstrap {
            url: self.token_url.clone(),
            reason: "response carries no token".to_string(),
        })?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(token)
    }

    async fn request(
        &self,
        client: &reqwest::Client,
        token: &str,
        lat: f64,
        lon: f64,
    ) -> Result<Option<serde_json::Value>, TransportError> {
        tracing::debug!(adapter = %self.name, url = %self.data_url, "session request");
        let request = client
            .post(&self.data_url)
            .bearer_auth(token)
            .form(&query_fields(self.format, lat, lon));
        send_json_authorized(request, &self.data_url).await
    }

    fn cached_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_token(&self) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn rejected(&self) -> TransportError {
        TransportError::Bootstrap {
            url: self.data_url.clone(),
            reason: "freshly issued token was rejected".to_string(),
        }
    }
}

/// Accepts `{"token": "..."}`-style objects (several key spellings) or a
/// bare JSON string.
fn extract_token(body: &serde_json::Value) -> Option<String> {
    let raw = match body {
        serde_json::Value::String(s) => Some(s.as_str()),
        serde_json::Value::Object(map) => TOKEN_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(serde_json::Value::as_str)),
        _ => None,
    }?;
    let token = raw.trim();
    (!token.is_empty()).then(|| token.to_string())
}
