//! Response plumbing shared by the catalog and backend clients.

use reqwest::Response;
use serde::de::DeserializeOwned;
use shared::error::extract_server_message;
use tracing::warn;
use url::Url;

use crate::error::ClientError;

/// Parses a base URL, forcing a trailing slash so relative joins keep the path.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ClientError::Validation(format!("invalid base url {raw:?}: {e}")))
}

pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path)
        .map_err(|e| ClientError::Validation(format!("invalid endpoint {path:?}: {e}")))
}

/// Turns non-2xx responses into a typed error, keeping the server's message
/// when the body has one.
pub(crate) async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = extract_server_message(&body);
    warn!(
        status = status.as_u16(),
        path = %url,
        server_message = message.as_deref().unwrap_or(""),
        "http request failed"
    );
    Err(ClientError::from_status(status.as_u16(), message))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

pub(crate) async fn expect_empty(response: Response) -> Result<(), ClientError> {
    check_status(response).await?;
    Ok(())
}
