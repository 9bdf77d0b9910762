//! HTTP client for the diagram generation service.

use async_trait::async_trait;
use flowchart::AttemptIndex;

use crate::{DiagramFetchError, DiagramSource};

/// [`DiagramSource`] that calls `GET <url>?algorithm=...`.
#[derive(Debug, Clone)]
pub struct HttpDiagramClient {
    http: reqwest::Client,
    url: String,
}

impl HttpDiagramClient {
    /// Creates a client for the endpoint at `url`
    /// (e.g. `http://engine:8000/generate_flowchart/`).
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DiagramSource for HttpDiagramClient {
    async fn fetch(
        &self,
        algorithm: &str,
        attempt: AttemptIndex,
    ) -> Result<Vec<u8>, DiagramFetchError> {
        tracing::debug!(attempt = attempt.get(), "requesting flowchart");

        let response = self
            .http
            .get(&self.url)
            .query(&[("algorithm", algorithm)])
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                attempt = attempt.get(),
                status = status.as_u16(),
                body = %body,
                "diagram service returned an error"
            );
            return Err(DiagramFetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
