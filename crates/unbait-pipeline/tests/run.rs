//! End-to-end pipeline run against mocked collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unbait_collect::{CollectError, Coordinator, HeadlineApiClient, NewsSource};
use unbait_core::{AppConfig, NormalizedArticle, SourceMode};
use unbait_detect::{
    ClickbaitDetector, ExtractorClient, JsonFileStore, RewriterClient, SentimentClient,
    SourceReliabilityTracker,
};
use unbait_index::IndexClient;
use unbait_pipeline::{ArticleProcessor, PipelineRunner};

struct StubSource {
    articles: Vec<NormalizedArticle>,
}

#[async_trait]
impl NewsSource for StubSource {
    fn key(&self) -> &str {
        "alpha-wire"
    }

    fn name(&self) -> &str {
        "Alpha Wire"
    }

    async fn fetch(&self, max_articles: usize) -> Result<Vec<NormalizedArticle>, CollectError> {
        Ok(self.articles.iter().take(max_articles).cloned().collect())
    }

    async fn check_access_policy(&self) -> bool {
        true
    }
}

fn article(title: &str, url: &str) -> NormalizedArticle {
    NormalizedArticle {
        title: title.to_string(),
        url: url.to_string(),
        content: String::new(),
        source: "Alpha Wire".to_string(),
        published_at: (chrono::Utc::now() - chrono::Duration::hours(2)).to_rfc3339(),
        author: String::new(),
        image_url: String::new(),
    }
}

fn config(server_uri: &str, reliability_path: PathBuf) -> AppConfig {
    AppConfig {
        news_api_key: "test-key".to_string(),
        sentiment_endpoint: Some(server_uri.to_string()),
        sentiment_key: Some("test-key".to_string()),
        extractor_endpoint: None,
        extractor_key: None,
        rewriter_endpoint: server_uri.to_string(),
        rewriter_key: "test-key".to_string(),
        rewriter_deployment: "test-deploy".to_string(),
        search_endpoint: server_uri.to_string(),
        search_key: "test-key".to_string(),
        search_index: "news-index".to_string(),
        source_mode: SourceMode::Rss,
        total_articles: 10,
        batch_size: 10,
        batch_delay_secs: 0,
        max_age_days: 7,
        title_similarity_threshold: 0.85,
        scoring_concurrency: 2,
        request_timeout_secs: 5,
        user_agent: "unbait-test".to_string(),
        sources_path: PathBuf::from("/nonexistent/sources.yaml"),
        reliability_path,
        log_level: "info".to_string(),
    }
}

fn sentiment_body(sentiment: &str, positive: f64, neutral: f64, negative: f64) -> serde_json::Value {
    serde_json::json!({
        "results": {
            "documents": [{
                "id": "1",
                "sentiment": sentiment,
                "confidenceScores": {
                    "positive": positive,
                    "neutral": neutral,
                    "negative": negative
                }
            }]
        }
    })
}

async fn mount_collaborators(server: &MockServer) {
    // Sentiment: headlines containing "slams" are strongly negative; mount
    // first so it wins over the catch-all neutral mock.
    Mock::given(method("POST"))
        .and(path("/language/:analyze-text"))
        .and(body_string_contains("slams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sentiment_body(
            "negative", 0.05, 0.10, 0.85,
        )))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/language/:analyze-text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sentiment_body(
            "neutral", 0.30, 0.50, 0.20,
        )))
        .mount(server)
        .await;

    // Rewriter.
    Mock::given(method("POST"))
        .and(path("/openai/deployments/test-deploy/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "text": "Minister criticises housing policy" }]
        })))
        .mount(server)
        .await;

    // Index: accepts the batch, rejecting one document by key.
    Mock::given(method("POST"))
        .and(path("/indexes/news-index/docs/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                { "key": "a", "status": true, "statusCode": 200 },
                { "key": "b", "status": false, "statusCode": 422, "errorMessage": "bad field" }
            ]
        })))
        .mount(server)
        .await;
}

fn build_runner(server_uri: &str, reliability_path: PathBuf) -> PipelineRunner {
    let cfg = config(server_uri, reliability_path);

    let coordinator = Coordinator::new(vec![Arc::new(StubSource {
        articles: vec![
            article("Council opens new library", "https://alpha.example.com/library"),
            article(
                "Minister slams housing policy",
                "https://alpha.example.com/housing",
            ),
            // Exact URL duplicate: rejected by the validator.
            article("Council opens new library", "https://alpha.example.com/library"),
            // Missing title: rejected by the validator.
            article("", "https://alpha.example.com/untitled"),
        ],
    }) as Arc<dyn NewsSource>]);

    let headline_api =
        HeadlineApiClient::with_base_url("test-key", 5, "unbait-test", server_uri).unwrap();

    let sentiment = Arc::new(
        SentimentClient::new(
            cfg.sentiment_endpoint.clone(),
            cfg.sentiment_key.clone(),
            5,
            "unbait-test",
        )
        .unwrap(),
    );
    let extractor = Arc::new(ExtractorClient::new(None, None, 5, "unbait-test").unwrap());
    let detector = ClickbaitDetector::new(Arc::clone(&sentiment), extractor);
    let rewriter = RewriterClient::new(
        &cfg.rewriter_endpoint,
        &cfg.rewriter_key,
        &cfg.rewriter_deployment,
        5,
        "unbait-test",
    )
    .unwrap();
    let processor = ArticleProcessor::new(sentiment, detector, rewriter);

    let index = IndexClient::new(
        &cfg.search_endpoint,
        &cfg.search_key,
        &cfg.search_index,
        5,
        "unbait-test",
    )
    .unwrap();

    let tracker =
        SourceReliabilityTracker::new(Box::new(JsonFileStore::new(&cfg.reliability_path)));

    PipelineRunner::new(cfg, coordinator, headline_api, processor, index, tracker)
}

#[tokio::test]
async fn full_run_validates_scores_rewrites_and_uploads() {
    let server = MockServer::start().await;
    mount_collaborators(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let reliability_path = dir.path().join("reliability.json");
    let runner = build_runner(&server.uri(), reliability_path.clone());

    let summary = runner.run().await.expect("run should complete");

    assert!(!summary.cancelled);
    assert_eq!(summary.stats.articles_fetched, 4);
    // Duplicate URL and missing title rejected; two articles processed.
    assert_eq!(summary.stats.articles_processed, 2);
    assert_eq!(summary.stats.rewrites_successful, 1);
    assert_eq!(summary.stats.articles_skipped, 1);
    assert_eq!(summary.stats.rewrites_failed, 0);
    // Index accepted the batch but rejected one document.
    assert_eq!(summary.batches_submitted, 1);
    assert_eq!(summary.stats.uploads_successful, 1);
    assert_eq!(summary.stats.uploads_failed, 1);

    // Final flush persisted both outcomes for the source.
    let saved = std::fs::read_to_string(&reliability_path).unwrap();
    let records: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(records["Alpha Wire"]["total_articles"], 2);
}

#[tokio::test]
async fn cancelled_run_submits_nothing_but_reports_counts() {
    let server = MockServer::start().await;
    mount_collaborators(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let runner = build_runner(&server.uri(), dir.path().join("reliability.json"));

    runner.cancel_flag().cancel();
    let summary = runner.run().await.expect("cancelled run still completes");

    assert!(summary.cancelled);
    assert_eq!(summary.batches_submitted, 0);
    assert_eq!(summary.stats.uploads_successful, 0);
    // Fetch and validation happened before the cancellation point.
    assert_eq!(summary.stats.articles_fetched, 4);
    assert_eq!(summary.stats.articles_processed, 0);
}
