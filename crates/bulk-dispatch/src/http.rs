//! HTTP transport for Elasticsearch-compatible index stores.

use crate::error::TransportError;
use crate::transport::{BulkResponse, Transport, TransportStatus};
use async_trait::async_trait;
use bulk_core::TargetConfig;
use bulk_generator::BulkPayload;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

const NDJSON: &str = "application/x-ndjson";

/// Rejected response bodies are cut to this many bytes in errors.
const MAX_ERROR_BODY: usize = 512;

/// Sends bulk payloads and administrative requests over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(target: &TargetConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(target.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: target.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bulk_url(&self) -> String {
        format!("{}/_bulk", self.base_url)
    }

    /// URL of the refresh endpoint for `indices`, or of all indices when empty.
    pub fn refresh_url(&self, indices: &[String]) -> String {
        if indices.is_empty() {
            format!("{}/_refresh", self.base_url)
        } else {
            format!("{}/{}/_refresh", self.base_url, indices.join(","))
        }
    }

    /// PUT a mapping document to `<base>/<index>`.
    pub async fn put_mapping(
        &self,
        index: &str,
        mapping: &serde_json::Value,
    ) -> Result<TransportStatus, TransportError> {
        let url = format!("{}/{}", self.base_url, index);
        debug!("PUT mapping to {}", url);

        let response = self.client.put(&url).json(mapping).send().await?;
        let status = response.status().as_u16();
        check_status(response).await?;

        Ok(TransportStatus {
            status,
            ..TransportStatus::LOCAL
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, payload: &BulkPayload) -> Result<TransportStatus, TransportError> {
        let response = self
            .client
            .post(self.bulk_url())
            .header(reqwest::header::CONTENT_TYPE, NDJSON)
            .body(payload.as_bytes().to_vec())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = check_status(response).await?;

        // Anything that is not a bulk response body is still a delivered payload.
        let parsed = serde_json::from_str::<BulkResponse>(&body).ok();
        if let Some(BulkResponse { errors: true, .. }) = parsed {
            warn!(
                "Bulk request for index {} accepted with item errors",
                payload.index_no()
            );
        }

        Ok(TransportStatus {
            status,
            took_ms: parsed.as_ref().and_then(|r| r.took),
            item_errors: parsed.map(|r| r.errors).unwrap_or(false),
        })
    }

    async fn refresh(&self, indices: &[String]) -> Result<(), TransportError> {
        let url = self.refresh_url(indices);
        debug!("Refreshing {}", url);
        let response = self.client.post(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Read the response body, turning a status >= 300 into [`TransportError::Rejected`].
async fn check_status(response: Response) -> Result<String, TransportError> {
    let status = response.status();
    let body = response.text().await?;

    if status.as_u16() >= 300 {
        let mut end = body.len().min(MAX_ERROR_BODY);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        return Err(TransportError::Rejected {
            status: status.as_u16(),
            body: body[..end].to_string(),
        });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(url: &str) -> HttpTransport {
        HttpTransport::new(&TargetConfig {
            url: url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let transport = transport("http://localhost:9200/");

        assert_eq!(transport.base_url(), "http://localhost:9200");
        assert_eq!(transport.bulk_url(), "http://localhost:9200/_bulk");
        assert_eq!(transport.refresh_url(&[]), "http://localhost:9200/_refresh");
        assert_eq!(
            transport.refresh_url(&["cat0".to_string(), "cat1".to_string()]),
            "http://localhost:9200/cat0,cat1/_refresh"
        );
    }

    #[tokio::test]
    async fn test_unreachable_store_is_request_error() {
        // Port 9 (discard) is closed on test hosts; the connect fails fast.
        let transport = transport("http://127.0.0.1:9");
        let result = transport.refresh(&[]).await;
        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
