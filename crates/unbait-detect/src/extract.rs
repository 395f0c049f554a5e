//! Article content extraction from URLs.
//!
//! Wraps a layout-analysis endpoint that works asynchronously: the initial
//! POST returns `202` with an `Operation-Location`, which is then polled
//! until the analysis succeeds. All failures degrade to
//! `Extraction { extracted: false, .. }`.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::DetectError;

const POLL_ATTEMPTS: u32 = 10;
const POLL_DELAY_SECS: u64 = 1;

/// Words that often indicate problematic content in article bodies.
const QUOTE_TRIGGERS: &[&str] = &[
    "threatens", "crisis", "disaster", "fails", "collapse", "scandal", "outrage", "fury", "slams",
    "blasts", "attacks", "destroys", "chaos", "panic", "fear", "violence", "death", "killed",
];

/// A sentence from the article that may explain a negative headline tone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuote {
    pub quote: String,
    pub trigger_word: &'static str,
}

/// Result of extracting content from an article URL.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub extracted: bool,
    pub full_text: String,
    pub key_quotes: Vec<KeyQuote>,
}

#[derive(Debug, Deserialize)]
struct OperationResult {
    #[serde(default)]
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(default)]
    content: String,
}

/// Client for the content-extraction collaborator. `None` credentials
/// disable extraction; every call then reports `extracted = false`.
pub struct ExtractorClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    key: Option<String>,
}

impl ExtractorClient {
    /// Creates an extraction client.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: Option<String>,
        key: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DetectError> {
        if endpoint.is_none() || key.is_none() {
            tracing::warn!("extractor credentials not configured; content extraction disabled");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            key,
        })
    }

    /// Extract content from an article URL. Never fails: any error degrades
    /// to `extracted = false`.
    pub async fn extract_from_url(&self, url: &str) -> Extraction {
        let (Some(endpoint), Some(key)) = (self.endpoint.as_deref(), self.key.as_deref()) else {
            return Extraction::default();
        };

        match self.try_extract(endpoint, key, url).await {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::error!(url, error = %e, "content extraction failed");
                Extraction::default()
            }
        }
    }

    async fn try_extract(
        &self,
        endpoint: &str,
        key: &str,
        url: &str,
    ) -> Result<Extraction, DetectError> {
        let analyze_url = format!(
            "{endpoint}/documentintelligence/documentModels/prebuilt-layout:analyze?api-version=2024-07-31-preview"
        );

        tracing::debug!(url, "starting document analysis");
        let response = self
            .client
            .post(&analyze_url)
            .header("Ocp-Apim-Subscription-Key", key)
            .json(&json!({ "urlSource": url }))
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::ACCEPTED {
            return Err(DetectError::UnexpectedStatus {
                status: status.as_u16(),
                context: "content extraction start".to_string(),
            });
        }

        let operation_location = response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                DetectError::OperationIncomplete(
                    "202 response without Operation-Location header".to_string(),
                )
            })?;

        self.poll_operation(&operation_location, key).await
    }

    async fn poll_operation(
        &self,
        operation_location: &str,
        key: &str,
    ) -> Result<Extraction, DetectError> {
        for attempt in 0..POLL_ATTEMPTS {
            let response = self
                .client
                .get(operation_location)
                .header("Ocp-Apim-Subscription-Key", key)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(DetectError::UnexpectedStatus {
                    status: status.as_u16(),
                    context: "content extraction poll".to_string(),
                });
            }

            let raw = response.text().await?;
            let result = serde_json::from_str::<OperationResult>(&raw).map_err(|e| {
                DetectError::Deserialize {
                    context: "content extraction operation".to_string(),
                    source: e,
                }
            })?;

            match result.status.as_str() {
                "succeeded" => {
                    let full_text = result
                        .analyze_result
                        .map(|r| r.content)
                        .unwrap_or_default();
                    let key_quotes = extract_key_quotes(&full_text);
                    tracing::info!(
                        chars = full_text.len(),
                        quotes = key_quotes.len(),
                        "content extraction succeeded"
                    );
                    return Ok(Extraction {
                        extracted: true,
                        full_text,
                        key_quotes,
                    });
                }
                "failed" => {
                    return Err(DetectError::OperationIncomplete(
                        "analysis reported failure".to_string(),
                    ));
                }
                _ => {
                    tracing::debug!(attempt, "analysis still running");
                    tokio::time::sleep(Duration::from_secs(POLL_DELAY_SECS)).await;
                }
            }
        }

        Err(DetectError::OperationIncomplete(format!(
            "analysis did not finish within {POLL_ATTEMPTS} polls"
        )))
    }
}

/// Pull up to three sentences containing a trigger word from the first part
/// of the article text.
fn extract_key_quotes(full_text: &str) -> Vec<KeyQuote> {
    let mut quotes = Vec::new();

    for sentence in full_text.split('.').take(20) {
        let sentence = sentence.trim();
        if sentence.len() <= 20 || sentence.len() >= 200 {
            continue;
        }
        let lower = sentence.to_lowercase();
        if let Some(trigger) = QUOTE_TRIGGERS.iter().find(|t| lower.contains(**t)) {
            quotes.push(KeyQuote {
                quote: sentence.to_string(),
                trigger_word: trigger,
            });
        }
        if quotes.len() >= 3 {
            break;
        }
    }

    quotes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_quotes_found_by_trigger_word() {
        let text = "The company announced record growth this quarter. \
                    Critics say the plan threatens local jobs across the region. \
                    Shares rose three percent.";
        let quotes = extract_key_quotes(text);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].trigger_word, "threatens");
        assert!(quotes[0].quote.contains("local jobs"));
    }

    #[test]
    fn key_quotes_skip_short_and_long_sentences() {
        let long = "a".repeat(250);
        let text = format!("Crisis. {long} crisis {long}. All quiet otherwise today");
        assert!(extract_key_quotes(&text).is_empty());
    }

    #[test]
    fn key_quotes_capped_at_three() {
        let text = "The crisis deepened again on Monday morning. \
                    Officials warned of more chaos at the ports. \
                    Markets reacted with visible panic yesterday. \
                    Experts fear the fury will not subside quickly.";
        assert_eq!(extract_key_quotes(text).len(), 3);
    }

    #[tokio::test]
    async fn unconfigured_extractor_reports_not_extracted() {
        let client = ExtractorClient::new(None, None, 5, "unbait-test").unwrap();
        let extraction = client.extract_from_url("https://example.com/story").await;
        assert!(!extraction.extracted);
        assert!(extraction.full_text.is_empty());
    }
}
