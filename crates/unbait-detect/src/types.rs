use serde::{Deserialize, Serialize};

/// Dominant sentiment label for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    /// Azure-style mixed sentiment; treated as its own label for mismatch
    /// comparison.
    Mixed,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Mixed => write!(f, "mixed"),
        }
    }
}

/// Per-label confidence percentages, summing to roughly 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentScores {
    #[must_use]
    pub fn max(&self) -> f64 {
        self.positive.max(self.neutral).max(self.negative)
    }
}

/// Sentiment analysis result for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnalysis {
    pub sentiment: SentimentLabel,
    pub scores: SentimentScores,
    pub enhanced_reason: Option<String>,
}

impl TextAnalysis {
    /// The neutral analysis used whenever the sentiment provider is
    /// unavailable or fails.
    #[must_use]
    pub fn neutral_fallback() -> Self {
        Self {
            sentiment: SentimentLabel::Neutral,
            scores: SentimentScores {
                positive: 33.0,
                neutral: 34.0,
                negative: 33.0,
            },
            enhanced_reason: Some(
                "Enhanced analysis unavailable - using basic tone detection".to_string(),
            ),
        }
    }
}

/// Whether an analysis came from the provider or from the neutral fallback.
///
/// Both variants are non-fatal; the distinction exists so callers and tests
/// can tell "succeeded" from "used fallback".
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Analyzed(TextAnalysis),
    Degraded(TextAnalysis),
}

impl AnalysisOutcome {
    #[must_use]
    pub fn analysis(&self) -> &TextAnalysis {
        match self {
            AnalysisOutcome::Analyzed(a) | AnalysisOutcome::Degraded(a) => a,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded(_))
    }
}

/// Clickbait pattern categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Exaggeration,
    CuriosityGap,
    Urgency,
    EmotionalManipulation,
    Listicles,
    Sensationalism,
}

impl PatternCategory {
    /// Reporting severity for the category; never a scoring weight.
    #[must_use]
    pub fn severity(self) -> PatternSeverity {
        match self {
            PatternCategory::CuriosityGap | PatternCategory::EmotionalManipulation => {
                PatternSeverity::High
            }
            PatternCategory::Exaggeration
            | PatternCategory::Sensationalism
            | PatternCategory::Urgency => PatternSeverity::Medium,
            PatternCategory::Listicles => PatternSeverity::Low,
        }
    }
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternCategory::Exaggeration => write!(f, "exaggeration"),
            PatternCategory::CuriosityGap => write!(f, "curiosity_gap"),
            PatternCategory::Urgency => write!(f, "urgency"),
            PatternCategory::EmotionalManipulation => write!(f, "emotional_manipulation"),
            PatternCategory::Listicles => write!(f, "listicles"),
            PatternCategory::Sensationalism => write!(f, "sensationalism"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSeverity {
    Low,
    Medium,
    High,
}

/// One matched clickbait pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub category: PatternCategory,
    pub pattern: &'static str,
    pub severity: PatternSeverity,
}

/// What to do with a headline, derived from the clickbait score alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Keep,
    RewriteMinor,
    RewriteMajor,
    Reject,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Keep => write!(f, "keep"),
            Recommendation::RewriteMinor => write!(f, "rewrite_minor"),
            Recommendation::RewriteMajor => write!(f, "rewrite_major"),
            Recommendation::Reject => write!(f, "reject"),
        }
    }
}

/// Full clickbait analysis for one headline. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ClickbaitAnalysis {
    /// Composite score in `[0, 100]`.
    pub score: u32,
    /// `score >= 70`.
    pub is_clickbait: bool,
    /// Detection confidence in `[0, 100]`.
    pub confidence: u32,
    pub pattern_matches: Vec<PatternMatch>,
    pub headline_sentiment: TextAnalysis,
    pub content_sentiment: Option<TextAnalysis>,
    pub sentiment_mismatch: bool,
    pub mismatch_severity: u32,
    pub recommendation: Recommendation,
    pub reasons: Vec<String>,
    /// True when any sentiment lookup fell back to neutral.
    pub degraded: bool,
}
