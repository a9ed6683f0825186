//! Request plumbing shared by the adapters: client construction, transport
//! error mapping, status checking and JSON decoding.

use helpers_core::config::HttpConfig;
use helpers_core::error::AppError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Builds a `reqwest` client from the shared HTTP settings.
pub(crate) fn build_client(config: &HttpConfig) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .build()
        .map_err(|e| AppError::ClientError(e.to_string()))
}

/// Maps a transport failure onto the connection error kinds.
pub(crate) fn map_send_error(e: reqwest::Error, config: &HttpConfig) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(config.timeout.as_secs())
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {}", e))
    } else {
        AppError::ClientError(e.to_string())
    }
}

/// Passes 2xx responses through; anything else becomes an upstream error
/// carrying the status and the response body.
pub(crate) async fn ensure_success(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().clone();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("HTTP {} from {}", status.as_u16(), url);
    Err(AppError::upstream(status.as_u16(), &body))
}

/// Reads the body and decodes it as `T`, reporting schema mismatches as
/// parse errors.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, AppError> {
    let url = resp.url().clone();
    let body = resp
        .text()
        .await
        .map_err(|e| {
            AppError::ClientError(format!("Failed to read response from {}: {}", url, e))
        })?;
    serde_json::from_str(&body)
        .map_err(|e| AppError::ParseError(format!("Unexpected response from {}: {}", url, e)))
}
