//! Remote media publisher
//!
//! Hands a staged local file to the external hosting service and returns
//! the durable public URL. Failure is a sentinel `None` rather than an
//! error: the contract has no retries and no reachability verification,
//! and the router translates `None` into a 500.

use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// Response body expected from the media host's upload endpoint.
#[derive(Deserialize)]
struct PublishResponse {
    url: String,
}

/// Client for the external media-hosting upload API.
#[derive(Debug, Clone)]
pub struct MediaHost {
    client: reqwest::Client,
    endpoint: String,
}

impl MediaHost {
    pub fn new(endpoint: impl Into<String>) -> Self {
        MediaHost {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Uploads the staged file and returns its public URL, or `None` on
    /// any failure (unreadable file, network error, non-success status,
    /// malformed response body).
    pub async fn publish(&self, path: &Path) -> Option<String> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read staged file");
                return None;
            }
        };

        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let part = reqwest::multipart::Part::bytes(data).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = match self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "media host unreachable");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "media host rejected upload");
            return None;
        }

        match response.json::<PublishResponse>().await {
            Ok(body) => Some(body.url),
            Err(err) => {
                tracing::warn!(error = %err, "malformed media host response");
                None
            }
        }
    }
}
