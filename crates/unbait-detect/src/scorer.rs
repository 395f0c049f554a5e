//! Clickbait detection engine.
//!
//! Combines lexical pattern matching over the headline with a comparison of
//! headline tone against the article body. The detector always produces an
//! analysis: sentiment failures degrade to neutral rather than erroring.

use std::sync::Arc;

use crate::extract::ExtractorClient;
use crate::patterns::check_patterns;
use crate::sentiment::SentimentClient;
use crate::types::{
    ClickbaitAnalysis, Recommendation, SentimentLabel, TextAnalysis,
};

/// Score at or above which a headline is classified as clickbait.
const CLICKBAIT_THRESHOLD: u32 = 70;

/// Longest slice of article content compared against the headline.
const MAX_CONTENT_CHARS: usize = 5000;

/// Detects clickbait by comparing headline sentiment to article content.
pub struct ClickbaitDetector {
    sentiment: Arc<SentimentClient>,
    extractor: Arc<ExtractorClient>,
}

/// Intermediate result of the content-mismatch step.
#[derive(Debug, Default)]
struct MismatchAnalysis {
    sentiment_mismatch: bool,
    mismatch_severity: u32,
    content_sentiment: Option<TextAnalysis>,
    reasons: Vec<String>,
    degraded: bool,
}

impl ClickbaitDetector {
    #[must_use]
    pub fn new(sentiment: Arc<SentimentClient>, extractor: Arc<ExtractorClient>) -> Self {
        Self {
            sentiment,
            extractor,
        }
    }

    /// Calculate the clickbait analysis for a headline.
    ///
    /// `article_content` is preferred when present; otherwise `article_url`
    /// is handed to the extractor. With neither, only pattern scoring runs.
    pub async fn analyze(
        &self,
        headline: &str,
        article_content: Option<&str>,
        article_url: Option<&str>,
    ) -> ClickbaitAnalysis {
        tracing::debug!(headline = truncate(headline, 50), "analysing headline");

        let headline_outcome = self.sentiment.analyze(headline).await;
        let mut degraded = headline_outcome.is_degraded();
        let headline_sentiment = headline_outcome.analysis().clone();

        let (pattern_score, pattern_matches) = check_patterns(&headline.to_lowercase());

        let mismatch = if article_content.is_some() || article_url.is_some() {
            let m = self
                .analyze_content_mismatch(article_content, article_url, &headline_sentiment)
                .await;
            degraded |= m.degraded;
            m
        } else {
            MismatchAnalysis::default()
        };

        let score = (pattern_score + mismatch.mismatch_severity).min(100);
        let is_clickbait = score >= CLICKBAIT_THRESHOLD;
        let confidence = calculate_confidence(
            pattern_matches.len(),
            mismatch.sentiment_mismatch,
            headline_sentiment.scores.max(),
        );
        let recommendation = recommendation_for(score);

        tracing::info!(score, recommendation = %recommendation, "clickbait analysis complete");

        ClickbaitAnalysis {
            score,
            is_clickbait,
            confidence,
            pattern_matches,
            headline_sentiment,
            content_sentiment: mismatch.content_sentiment,
            sentiment_mismatch: mismatch.sentiment_mismatch,
            mismatch_severity: mismatch.mismatch_severity,
            recommendation,
            reasons: mismatch.reasons,
            degraded,
        }
    }

    async fn analyze_content_mismatch(
        &self,
        article_content: Option<&str>,
        article_url: Option<&str>,
        headline_sentiment: &TextAnalysis,
    ) -> MismatchAnalysis {
        let mut result = MismatchAnalysis::default();

        let content = match article_content {
            Some(content) if !content.trim().is_empty() => content.to_string(),
            _ => match article_url {
                Some(url) => {
                    let extraction = self.extractor.extract_from_url(url).await;
                    if extraction.extracted {
                        extraction.full_text.chars().take(MAX_CONTENT_CHARS).collect()
                    } else {
                        String::new()
                    }
                }
                None => String::new(),
            },
        };

        if content.trim().is_empty() {
            tracing::debug!("no article content available for comparison");
            return result;
        }

        let truncated: String = content.chars().take(MAX_CONTENT_CHARS).collect();
        let content_outcome = self.sentiment.analyze(&truncated).await;
        result.degraded = content_outcome.is_degraded();
        let content_sentiment = content_outcome.analysis().clone();

        let headline_label = headline_sentiment.sentiment;
        let content_label = content_sentiment.sentiment;

        if headline_label != content_label {
            result.sentiment_mismatch = true;
            match (headline_label, content_label) {
                (SentimentLabel::Negative, SentimentLabel::Positive) => {
                    result.mismatch_severity = 40;
                    result
                        .reasons
                        .push("Headline is negative but article content is positive".to_string());
                    result
                        .reasons
                        .push("Likely clickbait to attract attention".to_string());
                }
                (SentimentLabel::Positive, SentimentLabel::Negative) => {
                    result.mismatch_severity = 30;
                    result
                        .reasons
                        .push("Headline is positive but article content is negative".to_string());
                    result
                        .reasons
                        .push("Possible misleading framing".to_string());
                }
                _ => {
                    result.mismatch_severity = 15;
                    result.reasons.push(format!(
                        "Sentiment mismatch: headline {headline_label}, content {content_label}"
                    ));
                }
            }
        }

        let headline_neg = headline_sentiment.scores.negative;
        let content_neg = content_sentiment.scores.negative;
        if (headline_neg - content_neg).abs() > 30.0 {
            result.mismatch_severity += 10;
            result.reasons.push(format!(
                "Large negative sentiment gap: headline {headline_neg:.0}%, content {content_neg:.0}%"
            ));
        }

        result.content_sentiment = Some(content_sentiment);
        result
    }
}

/// Confidence in the detection, `[0, 100]`.
fn calculate_confidence(match_count: usize, sentiment_mismatch: bool, max_sentiment: f64) -> u32 {
    let mut confidence = 50u32;

    if match_count >= 3 {
        confidence += 30;
    } else if match_count >= 1 {
        confidence += 15;
    }

    if sentiment_mismatch {
        confidence += 20;
    }

    if max_sentiment > 70.0 {
        confidence += 10;
    }

    confidence.min(100)
}

/// Recommendation thresholds over the composite score.
fn recommendation_for(score: u32) -> Recommendation {
    if score >= 85 {
        Recommendation::Reject
    } else if score >= 70 {
        Recommendation::RewriteMajor
    } else if score >= 40 {
        Recommendation::RewriteMinor
    } else {
        Recommendation::Keep
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ClickbaitDetector {
        // Unconfigured clients: sentiment degrades to the neutral fallback,
        // extraction reports nothing extracted.
        let sentiment =
            Arc::new(SentimentClient::new(None, None, 5, "unbait-test").unwrap());
        let extractor =
            Arc::new(ExtractorClient::new(None, None, 5, "unbait-test").unwrap());
        ClickbaitDetector::new(sentiment, extractor)
    }

    #[test]
    fn recommendation_boundaries() {
        assert_eq!(recommendation_for(39), Recommendation::Keep);
        assert_eq!(recommendation_for(40), Recommendation::RewriteMinor);
        assert_eq!(recommendation_for(69), Recommendation::RewriteMinor);
        assert_eq!(recommendation_for(70), Recommendation::RewriteMajor);
        assert_eq!(recommendation_for(84), Recommendation::RewriteMajor);
        assert_eq!(recommendation_for(85), Recommendation::Reject);
    }

    #[test]
    fn confidence_base_is_fifty() {
        assert_eq!(calculate_confidence(0, false, 34.0), 50);
    }

    #[test]
    fn confidence_steps() {
        assert_eq!(calculate_confidence(1, false, 34.0), 65);
        assert_eq!(calculate_confidence(2, false, 34.0), 65);
        assert_eq!(calculate_confidence(3, false, 34.0), 80);
        assert_eq!(calculate_confidence(0, true, 34.0), 70);
        assert_eq!(calculate_confidence(0, false, 80.0), 60);
    }

    #[test]
    fn confidence_caps_at_one_hundred() {
        assert_eq!(calculate_confidence(5, true, 95.0), 100);
    }

    #[tokio::test]
    async fn calm_headline_scores_zero_and_keeps() {
        let analysis = detector()
            .analyze("Council approves transport plan", None, None)
            .await;
        assert_eq!(analysis.score, 0);
        assert!(!analysis.is_clickbait);
        assert_eq!(analysis.recommendation, Recommendation::Keep);
        assert!(analysis.pattern_matches.is_empty());
    }

    #[tokio::test]
    async fn curiosity_headline_without_content_scores_thirty() {
        let analysis = detector()
            .analyze(
                "You Won't Believe What Shocking Thing Happened Next",
                None,
                None,
            )
            .await;
        assert_eq!(analysis.pattern_matches.len(), 3);
        assert_eq!(analysis.score, 30);
        assert!(!analysis.sentiment_mismatch);
        assert_eq!(analysis.recommendation, Recommendation::Keep);
        // 50 base + 30 for three matches; degraded neutral sentiment adds nothing.
        assert_eq!(analysis.confidence, 80);
        assert!(analysis.degraded);
    }

    #[tokio::test]
    async fn score_is_monotonic_in_pattern_matches() {
        let d = detector();
        let headlines = [
            "quiet local news today",
            "shocking news today",
            "shocking secret news today",
            "shocking secret revealed today",
        ];
        let mut previous = 0;
        for headline in headlines {
            let analysis = d.analyze(headline, None, None).await;
            assert!(
                analysis.score >= previous,
                "score dropped for {headline:?}: {} < {previous}",
                analysis.score
            );
            assert!(analysis.score <= 100);
            previous = analysis.score;
        }
    }

    #[tokio::test]
    async fn pattern_heavy_headline_is_capped() {
        let analysis = detector()
            .analyze(
                "Shocking unbelievable incredible amazing stunning secret revealed breaking urgent alert",
                None,
                None,
            )
            .await;
        // Pattern contribution caps at 50; no content, no mismatch.
        assert_eq!(analysis.score, 50);
        assert!(!analysis.is_clickbait);
    }

    #[tokio::test]
    async fn degraded_content_comparison_finds_no_mismatch() {
        // Both headline and content analyses fall back to neutral, so there
        // is no label mismatch and no severity.
        let analysis = detector()
            .analyze(
                "Markets slide on fresh fears",
                Some("Stocks fell modestly before recovering by the close."),
                None,
            )
            .await;
        assert!(!analysis.sentiment_mismatch);
        assert_eq!(analysis.mismatch_severity, 0);
        assert!(analysis.content_sentiment.is_some());
        assert!(analysis.degraded);
    }
}
