//! Cheap conditional probe of the remote content endpoint.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use crate::http::HttpClient;

/// Header carrying the timestamp of the last successful update.
const LAST_UPDATED_HEADER: &str = "lastUpdated";

/// Asks the remote endpoint whether newer content exists, without ever
/// touching the local store.
pub struct FreshnessChecker {
    client: Arc<HttpClient>,
    ping_url: String,
    timeout: Duration,
}

impl FreshnessChecker {
    pub fn new(client: Arc<HttpClient>, ping_url: String, timeout: Duration) -> Self {
        Self {
            client,
            ping_url,
            timeout,
        }
    }

    /// Whether a full download is warranted.
    ///
    /// Sends a conditional GET carrying `last_updated` (ISO-8601) and maps
    /// the outcome: 200 means new content, 304 means up to date, and any
    /// network failure or timeout means "assume offline". The call returns
    /// within the configured timeout; it never hangs on a dead connection.
    pub async fn check_for_update(&self, last_updated: DateTime<Utc>) -> bool {
        let stamp = last_updated.format("%Y-%m-%dT%H:%M:%S").to_string();
        let request = self
            .client
            .get_with_header(&self.ping_url, LAST_UPDATED_HEADER, &stamp);

        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log::debug!("Update check failed, assuming offline: {}", e);
                return false;
            }
            Err(_) => {
                log::debug!(
                    "Update check timed out after {:?}, assuming offline",
                    self.timeout
                );
                return false;
            }
        };

        match response.status() {
            StatusCode::OK => true,
            StatusCode::NOT_MODIFIED => false,
            // Anything else counts as no update, but gets surfaced in the log
            status => {
                log::warn!(
                    "Unexpected status {} from update endpoint {}",
                    status,
                    self.ping_url
                );
                false
            }
        }
    }
}
