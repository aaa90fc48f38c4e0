//! Shared HTTP plumbing for the supplier feed and marketplace clients.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{Result, SyncError};

/// User agent sent with every request
pub const USER_AGENT: &str = "watch_stock_sync/1.0";

/// Builds the HTTP client shared by all remote calls of one run.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(SyncError::Connectivity)
}

/// Passes successful responses through, turns anything else into
/// [`SyncError::Remote`] carrying the response body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
    log::error!("{url} responded with {status}: {body}");
    Err(SyncError::Remote { status, body })
}
