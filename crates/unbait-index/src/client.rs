//! HTTP client for the document index.
//!
//! Batches are POSTed whole. The index can accept a batch while rejecting
//! individual documents, so per-document statuses are tallied rather than
//! treating the batch as all-or-nothing. When the response cannot be parsed,
//! the whole batch is optimistically counted as successful.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::IndexError;
use crate::types::OutputDocument;

/// Per-batch accounting of what the index accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchUploadOutcome {
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
struct IndexBatchResponse {
    #[serde(default)]
    value: Vec<DocumentStatus>,
}

#[derive(Debug, Deserialize)]
struct DocumentStatus {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    status: Option<bool>,
    #[serde(rename = "statusCode", default)]
    status_code: Option<u16>,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

impl DocumentStatus {
    fn succeeded(&self) -> bool {
        self.status == Some(true) || matches!(self.status_code, Some(200 | 201))
    }
}

/// Client for the downstream search index.
pub struct IndexClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    index: String,
}

impl IndexClient {
    /// Creates an index client. The endpoint doubles as the base URL, so
    /// tests point it at a mock server directly.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: &str,
        key: &str,
        index: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            index: index.to_string(),
        })
    }

    /// Upload one batch of documents.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Http`] — transport failure; the whole batch failed.
    /// - [`IndexError::BatchRejected`] — non-2xx response; the whole batch
    ///   failed.
    ///
    /// A 2xx response always yields `Ok`: per-document failures are reported
    /// in the outcome, not as an error.
    pub async fn upload_batch(
        &self,
        documents: &[OutputDocument],
    ) -> Result<BatchUploadOutcome, IndexError> {
        let url = format!(
            "{}/indexes/{}/docs/index?api-version=2023-11-01",
            self.endpoint, self.index
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.key)
            .json(&json!({ "value": documents }))
            .send()
            .await?;

        let status = response.status();
        if !(status == reqwest::StatusCode::OK || status == reqwest::StatusCode::CREATED) {
            let body = response.text().await.unwrap_or_default();
            return Err(IndexError::BatchRejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        match serde_json::from_str::<IndexBatchResponse>(&raw) {
            Ok(parsed) if !parsed.value.is_empty() => {
                let successful = parsed.value.iter().filter(|d| d.succeeded()).count();
                let failed = parsed.value.len() - successful;
                for doc in parsed.value.iter().filter(|d| !d.succeeded()) {
                    tracing::error!(
                        key = doc.key.as_deref().unwrap_or("<unknown>"),
                        error = doc.error_message.as_deref().unwrap_or("<no message>"),
                        "document failed indexing"
                    );
                }
                Ok(BatchUploadOutcome { successful, failed })
            }
            _ => {
                // Accepted but no usable per-document statuses: count the
                // whole batch as successful.
                tracing::warn!("could not parse per-document results; assuming batch succeeded");
                Ok(BatchUploadOutcome {
                    successful: documents.len(),
                    failed: 0,
                })
            }
        }
    }
}
