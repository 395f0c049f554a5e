use serde::Serialize;
use uuid::Uuid;

/// One processed article ready for upload. Immutable after creation; owned by
/// the submission loop until acknowledged or counted as failed.
#[derive(Debug, Clone, Serialize)]
pub struct OutputDocument {
    #[serde(rename = "@search.action")]
    pub search_action: &'static str,
    pub id: Uuid,
    pub original_title: String,
    pub rewritten_title: String,
    pub original_content: String,
    pub source: String,
    pub published_date: String,
    pub article_url: String,
    pub was_rewritten: bool,
    pub original_tone: String,
    pub confidence_score: u32,
    pub rewrite_reason: String,
    pub clickbait_score: u32,
    pub is_clickbait: bool,
    /// Clickbait reasons joined with `"; "`, empty when none.
    pub clickbait_reasons: String,
}

impl OutputDocument {
    /// Start a document for an article that keeps its original headline.
    /// Fields default to the no-rewrite case and are adjusted by the caller.
    #[must_use]
    pub fn for_article(title: &str, source: &str, published_date: &str, url: &str) -> Self {
        Self {
            search_action: "upload",
            id: Uuid::new_v4(),
            original_title: title.to_string(),
            rewritten_title: title.to_string(),
            original_content: String::new(),
            source: source.to_string(),
            published_date: published_date.to_string(),
            article_url: url.to_string(),
            was_rewritten: false,
            original_tone: "NEUTRAL".to_string(),
            confidence_score: 50,
            rewrite_reason: String::new(),
            clickbait_score: 0,
            is_clickbait: false,
            clickbait_reasons: String::new(),
        }
    }
}
