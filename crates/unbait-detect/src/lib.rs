//! Headline tone analysis: clickbait scoring, sentiment, rewrite decisions,
//! and per-source reliability tracking.

mod error;
mod extract;
mod patterns;
mod reliability;
mod rewrite;
mod scorer;
mod sentiment;
mod types;

pub use error::DetectError;
pub use extract::{Extraction, ExtractorClient, KeyQuote};
pub use patterns::{check_patterns, find_problematic_phrases, PhraseHit};
pub use reliability::{
    JsonFileStore, ReliabilityRating, ReliabilityReport, ReportEntry, SourceReliabilityRecord,
    SourceReliabilityTracker, StatsStore,
};
pub use rewrite::{decide_rewrite, RewriteDecision, RewriterClient, Tone};
pub use scorer::ClickbaitDetector;
pub use sentiment::SentimentClient;
pub use types::{
    AnalysisOutcome, ClickbaitAnalysis, PatternCategory, PatternMatch, PatternSeverity,
    Recommendation, SentimentLabel, SentimentScores, TextAnalysis,
};
