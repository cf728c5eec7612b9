//! Per-endpoint fetch

use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CollectError, Result};

/// Issues GETs against metrics endpoints with a shared client
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    header_timeout: Duration,
}

impl Fetcher {
    pub fn new(client: Client, header_timeout: Duration) -> Self {
        Self {
            client,
            header_timeout,
        }
    }

    /// GET `url` and return the whole body.
    ///
    /// The status code is not checked: whatever body comes back goes to the
    /// decoder, so an error page surfaces as a decode error. Non-2xx
    /// statuses are logged.
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        // send() resolves once the status line and headers are in
        let response = tokio::time::timeout(self.header_timeout, self.client.get(url).send())
            .await
            .map_err(|_| CollectError::header_timeout(self.header_timeout))??;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Metrics endpoint returned non-success status");
        }

        // consumes the response, releasing the connection whatever happens next
        let body = response.bytes().await?;

        debug!(url = %url, status = %status, bytes = body.len(), "Fetched metrics");
        Ok(body)
    }
}
