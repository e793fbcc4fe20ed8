//! Low-level HTTP helpers shared by the source adapters.

use reqwest::{RequestBuilder, StatusCode};

use crate::error::TransportError;

/// Send a prepared request and decode the body as JSON.
///
/// Non-2xx statuses, empty bodies, a literal `null` and non-JSON bodies are
/// transport failures. Any parseable JSON, whatever its shape, is returned
/// as-is for the normalizer to judge.
pub(crate) async fn send_json(
    request: RequestBuilder,
    url: &str,
) -> Result<serde_json::Value, TransportError> {
    let response = request
        .header(reqwest::header::ACCEPT, "application/json, */*;q=0.8")
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let body = response.text().await?;
    decode_body(&body, url)
}

/// Like [`send_json`] but hands authorization failures back to the caller
/// as `Ok(None)` so a session adapter can re-bootstrap.
pub(crate) async fn send_json_authorized(
    request: RequestBuilder,
    url: &str,
) -> Result<Option<serde_json::Value>, TransportError> {
    let response = request
        .header(reqwest::header::ACCEPT, "application/json, */*;q=0.8")
        .send()
        .await?;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(TransportError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let body = response.text().await?;
    decode_body(&body, url).map(Some)
}

fn decode_body(body: &str, url: &str) -> Result<serde_json::Value, TransportError> {
    // Some proxies prepend a UTF-8 BOM.
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Err(TransportError::EmptyBody {
            url: url.to_owned(),
        });
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| TransportError::InvalidJson {
            url: url.to_owned(),
            source: e,
        })?;

    if value.is_null() {
        return Err(TransportError::EmptyBody {
            url: url.to_owned(),
        });
    }
    Ok(value)
}
