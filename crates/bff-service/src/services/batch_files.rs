//! Batch file-service HTTP client.
//!
//! Proxies S3 signed-url generation, batch file listing/deletion and job
//! queries to the batch API. Bodies are passed through verbatim; the BFF
//! only contributes authentication, the validated source segment and the
//! caller's username for job scoping.

use crate::errors::BffError;
use crate::models::BatchSource;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

/// Timeout for batch API requests in seconds.
const BATCH_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Correlation id header propagated to the batch API.
const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// HTTP client for the batch file service.
#[derive(Clone)]
pub struct BatchServiceClient {
    /// HTTP client with configured timeouts.
    client: reqwest::Client,

    /// Base URL of the batch API.
    base_url: String,
}

impl BatchServiceClient {
    /// Create a new batch client.
    ///
    /// # Errors
    ///
    /// Returns `BffError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, BffError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(BATCH_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                tracing::error!(target: "bff.services.batch", error = %e, "Failed to build HTTP client");
                BffError::Internal
            })?;

        Ok(Self { client, base_url })
    }

    /// Request signed URLs for uploading or downloading batch files.
    ///
    /// # Errors
    ///
    /// Returns `BffError::UpstreamBatch` when the batch API fails.
    #[instrument(skip_all, name = "bff.services.batch.signed_urls")]
    pub async fn signed_urls(
        &self,
        source: BatchSource,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, BffError> {
        let url = format!(
            "{}/v1/batch/files/signed-url/{}",
            self.base_url,
            source.as_str()
        );
        self.execute(self.client.post(&url).json(body)).await
    }

    /// List batch files for the given source bucket.
    ///
    /// # Errors
    ///
    /// Returns `BffError::UpstreamBatch` when the batch API fails.
    #[instrument(skip_all, name = "bff.services.batch.list_files")]
    pub async fn list_files(&self, source: BatchSource) -> Result<serde_json::Value, BffError> {
        let url = format!("{}/v1/batch/files/{}", self.base_url, source.as_str());
        self.execute(self.client.get(&url)).await
    }

    /// Delete batch files named in the body from the given source bucket.
    ///
    /// # Errors
    ///
    /// Returns `BffError::UpstreamBatch` when the batch API fails.
    #[instrument(skip_all, name = "bff.services.batch.delete_files")]
    pub async fn delete_files(
        &self,
        source: BatchSource,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, BffError> {
        let url = format!("{}/v1/batch/files/{}", self.base_url, source.as_str());
        self.execute(self.client.delete(&url).json(body)).await
    }

    /// List batch jobs for the given user.
    ///
    /// # Errors
    ///
    /// Returns `BffError::UpstreamBatch` when the batch API fails.
    #[instrument(skip_all, name = "bff.services.batch.list_jobs")]
    pub async fn list_jobs(&self, username: &str) -> Result<serde_json::Value, BffError> {
        let url = format!("{}/v1/batch/users/{username}/jobs", self.base_url);
        self.execute(self.client.get(&url)).await
    }

    /// Send a prepared request and surface upstream errors.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, BffError> {
        let response = request
            .header(CORRELATION_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await
            .map_err(|e| BffError::UpstreamBatch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = error_body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("upstream returned an error");
            return Err(BffError::UpstreamBatch(format!("{status}: {message}")));
        }

        response
            .json()
            .await
            .map_err(|e| BffError::UpstreamBatch(format!("malformed response: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_signed_urls_posts_to_source_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/batch/files/signed-url/input"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"file1.csv": "https://signed"}})),
            )
            .mount(&server)
            .await;

        let client = BatchServiceClient::new(server.uri()).unwrap();
        let data = client
            .signed_urls(BatchSource::Input, &json!({"fileNames": ["file1.csv"]}))
            .await
            .unwrap();

        assert_eq!(data["data"]["file1.csv"], "https://signed");
    }

    #[tokio::test]
    async fn test_list_jobs_scopes_by_username() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batch/users/jdoe/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobs": []})))
            .mount(&server)
            .await;

        let client = BatchServiceClient::new(server.uri()).unwrap();
        let data = client.list_jobs("jdoe").await.unwrap();

        assert_eq!(data["jobs"], json!([]));
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_batch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/batch/files/output"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "bucket unavailable"})),
            )
            .mount(&server)
            .await;

        let client = BatchServiceClient::new(server.uri()).unwrap();
        let result = client.list_files(BatchSource::Output).await;

        assert!(
            matches!(result, Err(BffError::UpstreamBatch(msg)) if msg.contains("bucket unavailable"))
        );
    }
}
