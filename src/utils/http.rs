//! HTTP client utilities shared by the JSON/XML API clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::trace;

use super::errors::{SourceError, SourceResult};
use crate::HttpConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client-level timeout is the hard deadline for a whole request,
/// body included. The shorter response timeout is applied per request by
/// [`send`].
pub fn create_client(user_agent: &str, config: &HttpConfig) -> SourceResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(config.deadline_ms))
        .build()?;
    Ok(client)
}

/// Send a GET and wait for the response headers, bounded by the response timeout.
///
/// Non-success statuses are turned into [`SourceError::Status`] so the retry
/// policy can classify them.
pub async fn send(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    config: &HttpConfig,
) -> SourceResult<reqwest::Response> {
    trace!("GET {} {:?}", url, query);
    let request = client.get(url).query(query).send();

    let response = tokio::time::timeout(Duration::from_millis(config.response_timeout_ms), request)
        .await
        .map_err(|_| SourceError::timeout(config.response_timeout_ms, format!("GET {url}")))??;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// Fetch and deserialize a JSON document.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    config: &HttpConfig,
) -> SourceResult<T> {
    let body = send(client, url, query, config).await?.text().await?;
    serde_json::from_str(&body).map_err(|e| SourceError::decode(url, e))
}

/// Fetch a response body as text.
pub async fn get_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
    config: &HttpConfig,
) -> SourceResult<String> {
    Ok(send(client, url, query, config).await?.text().await?)
}
