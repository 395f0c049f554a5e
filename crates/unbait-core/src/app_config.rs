use std::path::PathBuf;

/// Where articles are pulled from for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// RSS collectors only.
    Rss,
    /// Paged headline API only.
    NewsApi,
    /// Half headline API, half RSS, shuffled together.
    Mixed,
}

impl std::fmt::Display for SourceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceMode::Rss => write!(f, "rss"),
            SourceMode::NewsApi => write!(f, "newsapi"),
            SourceMode::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Headline API key (paged fetch phase).
    pub news_api_key: String,
    /// Sentiment analysis endpoint + key; `None` disables analysis and the
    /// scorer runs on the neutral fallback.
    pub sentiment_endpoint: Option<String>,
    pub sentiment_key: Option<String>,
    /// Content extraction endpoint + key; `None` disables URL extraction.
    pub extractor_endpoint: Option<String>,
    pub extractor_key: Option<String>,
    /// Headline rewriter endpoint, key, and deployment name.
    pub rewriter_endpoint: String,
    pub rewriter_key: String,
    pub rewriter_deployment: String,
    /// Downstream search index endpoint, key, and index name.
    pub search_endpoint: String,
    pub search_key: String,
    pub search_index: String,

    pub source_mode: SourceMode,
    pub total_articles: usize,
    pub batch_size: usize,
    pub batch_delay_secs: u64,
    pub max_age_days: i64,
    pub title_similarity_threshold: f64,
    pub scoring_concurrency: usize,

    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub sources_path: PathBuf,
    pub reliability_path: PathBuf,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("news_api_key", &"[redacted]")
            .field(
                "sentiment_endpoint",
                &self.sentiment_endpoint.as_deref().unwrap_or("<disabled>"),
            )
            .field(
                "sentiment_key",
                &self.sentiment_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "extractor_endpoint",
                &self.extractor_endpoint.as_deref().unwrap_or("<disabled>"),
            )
            .field(
                "extractor_key",
                &self.extractor_key.as_ref().map(|_| "[redacted]"),
            )
            .field("rewriter_endpoint", &self.rewriter_endpoint)
            .field("rewriter_key", &"[redacted]")
            .field("rewriter_deployment", &self.rewriter_deployment)
            .field("search_endpoint", &self.search_endpoint)
            .field("search_key", &"[redacted]")
            .field("search_index", &self.search_index)
            .field("source_mode", &self.source_mode)
            .field("total_articles", &self.total_articles)
            .field("batch_size", &self.batch_size)
            .field("batch_delay_secs", &self.batch_delay_secs)
            .field("max_age_days", &self.max_age_days)
            .field(
                "title_similarity_threshold",
                &self.title_similarity_threshold,
            )
            .field("scoring_concurrency", &self.scoring_concurrency)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("sources_path", &self.sources_path)
            .field("reliability_path", &self.reliability_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}
