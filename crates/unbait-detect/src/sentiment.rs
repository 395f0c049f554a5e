//! Sentiment analysis client.
//!
//! Wraps a text-analytics endpoint and degrades to a neutral fallback on any
//! failure — scoring must always get an answer. The outcome type records
//! whether the fallback was used.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::DetectError;
use crate::types::{AnalysisOutcome, SentimentLabel, SentimentScores, TextAnalysis};

/// Longest text slice sent for analysis.
const MAX_ANALYSIS_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
struct SentimentEnvelope {
    results: SentimentResults,
}

#[derive(Debug, Deserialize)]
struct SentimentResults {
    #[serde(default)]
    documents: Vec<SentimentDocument>,
}

#[derive(Debug, Deserialize)]
struct SentimentDocument {
    sentiment: String,
    #[serde(rename = "confidenceScores")]
    confidence_scores: ConfidenceScores,
}

#[derive(Debug, Deserialize)]
struct ConfidenceScores {
    #[serde(default)]
    positive: f64,
    #[serde(default)]
    neutral: f64,
    #[serde(default)]
    negative: f64,
}

/// Client for the sentiment analysis collaborator.
///
/// Construct with `None` credentials to run permanently degraded (analysis
/// disabled, neutral fallback for every text).
pub struct SentimentClient {
    client: reqwest::Client,
    endpoint: Option<String>,
    key: Option<String>,
}

impl SentimentClient {
    /// Creates a sentiment client. `endpoint`/`key` of `None` disables the
    /// provider; every call then returns the degraded neutral analysis.
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
            tracing::warn!("sentiment credentials not configured; analysis disabled");
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

    /// Analyze a text's sentiment. Never fails: provider errors degrade to
    /// the neutral fallback, reported via [`AnalysisOutcome::Degraded`].
    pub async fn analyze(&self, text: &str) -> AnalysisOutcome {
        let (Some(endpoint), Some(key)) = (self.endpoint.as_deref(), self.key.as_deref()) else {
            return AnalysisOutcome::Degraded(TextAnalysis::neutral_fallback());
        };

        match self.try_analyze(endpoint, key, text).await {
            Ok(analysis) => AnalysisOutcome::Analyzed(analysis),
            Err(e) => {
                tracing::error!(error = %e, "sentiment analysis failed; using neutral fallback");
                AnalysisOutcome::Degraded(TextAnalysis::neutral_fallback())
            }
        }
    }

    async fn try_analyze(
        &self,
        endpoint: &str,
        key: &str,
        text: &str,
    ) -> Result<TextAnalysis, DetectError> {
        let truncated: String = text.chars().take(MAX_ANALYSIS_CHARS).collect();
        let url = format!("{endpoint}/language/:analyze-text?api-version=2023-04-01");
        let body = json!({
            "kind": "SentimentAnalysis",
            "analysisInput": {
                "documents": [
                    { "id": "1", "language": "en", "text": truncated }
                ]
            }
        });

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::UnexpectedStatus {
                status: status.as_u16(),
                context: "sentiment analysis".to_string(),
            });
        }

        let raw = response.text().await?;
        let envelope =
            serde_json::from_str::<SentimentEnvelope>(&raw).map_err(|e| {
                DetectError::Deserialize {
                    context: "sentiment analysis response".to_string(),
                    source: e,
                }
            })?;

        let Some(document) = envelope.results.documents.into_iter().next() else {
            return Err(DetectError::OperationIncomplete(
                "sentiment response contained no documents".to_string(),
            ));
        };

        let sentiment = parse_label(&document.sentiment);
        let scores = SentimentScores {
            positive: document.confidence_scores.positive * 100.0,
            neutral: document.confidence_scores.neutral * 100.0,
            negative: document.confidence_scores.negative * 100.0,
        };
        let enhanced_reason = sentiment_reason(sentiment, &scores);

        tracing::debug!(sentiment = %sentiment, "sentiment analysis successful");

        Ok(TextAnalysis {
            sentiment,
            scores,
            enhanced_reason,
        })
    }
}

fn parse_label(raw: &str) -> SentimentLabel {
    match raw {
        "positive" => SentimentLabel::Positive,
        "negative" => SentimentLabel::Negative,
        "mixed" => SentimentLabel::Mixed,
        _ => SentimentLabel::Neutral,
    }
}

/// Human-readable reasoning attached to strong sentiment results.
fn sentiment_reason(sentiment: SentimentLabel, scores: &SentimentScores) -> Option<String> {
    match sentiment {
        SentimentLabel::Negative if scores.negative > 70.0 => Some(format!(
            "Strong negative sentiment detected ({:.0}% confidence). Headlines with negative tone can impact reader mood and engagement.",
            scores.negative
        )),
        SentimentLabel::Positive if scores.positive > 80.0 => Some(format!(
            "Already positive sentiment ({:.0}% confidence). Headline maintains factual accuracy while conveying optimism.",
            scores.positive
        )),
        SentimentLabel::Neutral if scores.negative > scores.positive => Some(format!(
            "Neutral tone with negative lean ({:.0}% negative vs {:.0}% positive). Can be enhanced for more positive reader experience.",
            scores.negative, scores.positive
        )),
        _ => None,
    }
}
