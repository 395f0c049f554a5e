//! Per-article processing: tone analysis, clickbait scoring, rewrite
//! decision, and document construction.

use std::sync::Arc;

use unbait_core::NormalizedArticle;
use unbait_detect::{
    decide_rewrite, find_problematic_phrases, ClickbaitDetector, RewriterClient, SentimentClient,
};
use unbait_index::OutputDocument;

/// Everything the run loop needs to know about one processed article.
#[derive(Debug)]
pub struct ProcessedArticle {
    pub document: OutputDocument,
    pub source: String,
    pub clickbait_score: u32,
    pub is_clickbait: bool,
    pub rewritten: bool,
    /// Sentiment lookups fell back to neutral somewhere along the way.
    pub degraded: bool,
}

/// Outcome of processing one article. A failed rewrite drops the article
/// from its batch but still carries the scoring data so the reliability
/// tracker sees it.
#[derive(Debug)]
pub enum ArticleOutcome {
    Processed(Box<ProcessedArticle>),
    RewriteFailed {
        source: String,
        clickbait_score: u32,
        is_clickbait: bool,
    },
}

impl ArticleOutcome {
    /// `(source, score, was_clickbait)` for the reliability tracker,
    /// regardless of how processing ended.
    #[must_use]
    pub fn tracking(&self) -> (&str, u32, bool) {
        match self {
            ArticleOutcome::Processed(p) => (&p.source, p.clickbait_score, p.is_clickbait),
            ArticleOutcome::RewriteFailed {
                source,
                clickbait_score,
                is_clickbait,
            } => (source, *clickbait_score, *is_clickbait),
        }
    }
}

/// Scores one article and builds its output document.
pub struct ArticleProcessor {
    sentiment: Arc<SentimentClient>,
    detector: ClickbaitDetector,
    rewriter: RewriterClient,
}

impl ArticleProcessor {
    #[must_use]
    pub fn new(
        sentiment: Arc<SentimentClient>,
        detector: ClickbaitDetector,
        rewriter: RewriterClient,
    ) -> Self {
        Self {
            sentiment,
            detector,
            rewriter,
        }
    }

    /// Process one article: analyze tone, score clickbait, decide on a
    /// rewrite, and build the output document. Never panics and never
    /// escapes an error — a failed rewrite becomes
    /// [`ArticleOutcome::RewriteFailed`].
    pub async fn process(&self, article: &NormalizedArticle) -> ArticleOutcome {
        let title = article.title.trim();
        tracing::info!(title = %truncate(title, 50), "processing article");

        let tone_outcome = self.sentiment.analyze(title).await;
        let tone_analysis = tone_outcome.analysis().clone();
        let phrases = find_problematic_phrases(title);

        // Clickbait scoring compares the headline against the article body,
        // extracted from the URL when available.
        let url = if article.url.trim().is_empty() {
            None
        } else {
            Some(article.url.as_str())
        };
        let clickbait = self.detector.analyze(title, None, url).await;

        tracing::info!(
            score = clickbait.score,
            is_clickbait = clickbait.is_clickbait,
            "clickbait score computed"
        );

        let decision = decide_rewrite(&tone_analysis, &phrases);

        let mut rewritten_title = title.to_string();
        let mut was_rewritten = false;
        if decision.should_rewrite() {
            match self.rewriter.rewrite(title, decision.style_hint()).await {
                Ok(rewrite) => {
                    tracing::info!(rewritten = %truncate(&rewrite, 50), "headline rewritten");
                    rewritten_title = rewrite;
                    was_rewritten = true;
                }
                Err(e) => {
                    tracing::error!(error = %e, "rewrite failed; dropping article from batch");
                    return ArticleOutcome::RewriteFailed {
                        source: article.source.clone(),
                        clickbait_score: clickbait.score,
                        is_clickbait: clickbait.is_clickbait,
                    };
                }
            }
        } else {
            tracing::debug!(reason = %truncate(&decision.reason, 50), "rewrite skipped");
        }

        let mut document = OutputDocument::for_article(
            title,
            &article.source,
            &article.published_at,
            &article.url,
        );
        document.rewritten_title = rewritten_title;
        document.original_content = article.content.clone();
        document.was_rewritten = was_rewritten;
        document.original_tone = decision.tone.to_string();
        document.confidence_score = decision.confidence;
        document.rewrite_reason = decision.reason;
        document.clickbait_score = clickbait.score;
        document.is_clickbait = clickbait.is_clickbait;
        document.clickbait_reasons = clickbait.reasons.join("; ");

        ArticleOutcome::Processed(Box::new(ProcessedArticle {
            source: article.source.clone(),
            clickbait_score: clickbait.score,
            is_clickbait: clickbait.is_clickbait,
            rewritten: was_rewritten,
            degraded: tone_outcome.is_degraded() || clickbait.degraded,
            document,
        }))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
