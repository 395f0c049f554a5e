//! Tone-based rewrite decision and the headline rewriter client.
//!
//! The rewrite decision is independent of the clickbait recommendation: it is
//! driven by raw headline sentiment and problematic phrasing, and it alone
//! gates the generative rewrite call. The two notions are deliberately never
//! reconciled.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::error::DetectError;
use crate::patterns::PhraseHit;
use crate::types::{SentimentLabel, TextAnalysis};

/// Overall tone assigned to a headline by the rewrite decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Negative,
    Positive,
    Mixed,
    /// Negative framing detected through problematic phrasing rather than
    /// sentiment confidence.
    Sensational,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Neutral => write!(f, "NEUTRAL"),
            Tone::Negative => write!(f, "NEGATIVE"),
            Tone::Positive => write!(f, "POSITIVE"),
            Tone::Mixed => write!(f, "MIXED"),
            Tone::Sensational => write!(f, "NEGATIVE/SENSATIONAL"),
        }
    }
}

/// Whether a headline needs rewriting, and with what confidence.
#[derive(Debug, Clone)]
pub struct RewriteDecision {
    pub needs_rewrite: bool,
    pub confidence: u32,
    pub tone: Tone,
    pub reason: String,
}

impl RewriteDecision {
    /// A rewrite is only actually issued above 60% confidence.
    #[must_use]
    pub fn should_rewrite(&self) -> bool {
        self.needs_rewrite && self.confidence >= 60
    }

    /// Style hint passed to the rewriter.
    #[must_use]
    pub fn style_hint(&self) -> &'static str {
        match self.tone {
            Tone::Negative | Tone::Sensational => "calm, factual",
            _ => "slightly more positive",
        }
    }
}

/// Derive the rewrite decision from raw headline sentiment and any
/// problematic phrases found in the headline.
#[must_use]
pub fn decide_rewrite(analysis: &TextAnalysis, problematic: &[PhraseHit]) -> RewriteDecision {
    let negative = analysis.scores.negative;
    let positive = analysis.scores.positive;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (needs_rewrite, confidence, tone) =
        if analysis.sentiment == SentimentLabel::Negative && negative > 60.0 {
            (true, negative as u32, Tone::Negative)
        } else if analysis.sentiment == SentimentLabel::Positive && positive > 80.0 {
            (false, positive as u32, Tone::Positive)
        } else if !problematic.is_empty() {
            (true, 75, Tone::Sensational)
        } else {
            let tone = match analysis.sentiment {
                SentimentLabel::Positive => Tone::Positive,
                SentimentLabel::Negative => Tone::Negative,
                SentimentLabel::Mixed => Tone::Mixed,
                SentimentLabel::Neutral => Tone::Neutral,
            };
            let confidence = analysis.scores.max() as u32;
            (negative > positive && negative > 40.0, confidence, tone)
        };

    let mut reason_parts = Vec::new();
    if let Some(enhanced) = &analysis.enhanced_reason {
        reason_parts.push(enhanced.clone());
    }
    if !problematic.is_empty() {
        let examples: Vec<String> = problematic
            .iter()
            .take(2)
            .map(|p| format!("'{}'", p.phrase))
            .collect();
        reason_parts.push(format!("Contains negative language: {}", examples.join(", ")));
    }
    let reason = if reason_parts.is_empty() {
        "Standard tone analysis".to_string()
    } else {
        reason_parts.join(". ")
    };

    RewriteDecision {
        needs_rewrite,
        confidence,
        tone,
        reason,
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

/// Client for the generative headline rewriter.
pub struct RewriterClient {
    client: reqwest::Client,
    endpoint: String,
    key: String,
    deployment: String,
}

impl RewriterClient {
    /// Creates a rewriter client. The endpoint doubles as the base URL, so
    /// tests point it at a mock server directly.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        endpoint: &str,
        key: &str,
        deployment: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, DetectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            deployment: deployment.to_string(),
        })
    }

    /// Rewrite a headline in the given style, preserving factual content.
    ///
    /// # Errors
    ///
    /// - [`DetectError::Http`] on network failure.
    /// - [`DetectError::UnexpectedStatus`] on a non-2xx response.
    /// - [`DetectError::Deserialize`] if the completion body is malformed.
    /// - [`DetectError::EmptyCompletion`] if the model returns nothing usable.
    pub async fn rewrite(&self, title: &str, style: &str) -> Result<String, DetectError> {
        let url = format!(
            "{}/openai/deployments/{}/completions?api-version=2024-12-01-preview",
            self.endpoint, self.deployment
        );
        let prompt = format!(
            "Rewrite this headline in a {style} tone while preserving all factual information:\n\n\
             Original: \"{title}\"\n\n\
             Requirements:\n\
             - Keep all facts accurate\n\
             - Maintain the core message\n\
             - Use {style} language\n\
             - Return ONLY the rewritten headline"
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.key)
            .json(&json!({ "prompt": prompt, "max_tokens": 80 }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::UnexpectedStatus {
                status: status.as_u16(),
                context: "headline rewrite".to_string(),
            });
        }

        let raw = response.text().await?;
        let parsed = serde_json::from_str::<CompletionResponse>(&raw).map_err(|e| {
            DetectError::Deserialize {
                context: "rewrite completion".to_string(),
                source: e,
            }
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();
        let cleaned = clean_completion(&text);
        if cleaned.is_empty() {
            return Err(DetectError::EmptyCompletion);
        }
        Ok(cleaned)
    }
}

/// Strip wrapping quotes and `Rewritten:`/`New:` prefixes from a completion.
fn clean_completion(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    if text.starts_with('"') && text.ends_with('"') && text.len() >= 2 {
        text = text[1..text.len() - 1].to_string();
    }

    for prefix in ["Rewritten:", "New:"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim().to_string();
        }
    }

    text.trim().to_string()
}
