//! Shared HTTP plumbing for the tracker and CI clients
//!
//! Each service gets its own [`Client`], so relaxing certificate checks for
//! one never affects the other.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("ticket-check/", env!("CARGO_PKG_VERSION"));

/// Build a client whose every request times out after `timeout`
pub fn build_client(timeout: Duration, accept_invalid_certs: bool) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send `request` and read the whole body
///
/// Transport failures (refused connection, DNS, timeout, truncated body) are
/// reported as [`Error::Connectivity`]; status handling is left to the caller.
pub async fn get_text(request: RequestBuilder, url: &str) -> Result<(StatusCode, String)> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::connectivity(url, describe(&e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::connectivity(url, describe(&e)))?;

    debug!("GET {} -> {} ({} bytes)", url, status, body.len());
    Ok((status, body))
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed ({})", err)
    } else {
        err.to_string()
    }
}
