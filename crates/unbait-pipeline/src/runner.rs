//! One pipeline run: fetch, validate, process in batches, submit.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;

use unbait_collect::{
    build_sources, builtin_specs, ContentValidator, Coordinator, HeadlineApiClient, TopicSpec,
};
use unbait_core::{load_sources, AppConfig, NormalizedArticle, SourceMode};
use unbait_detect::{
    ClickbaitDetector, ExtractorClient, JsonFileStore, ReliabilityReport, RewriterClient,
    SentimentClient, SourceReliabilityTracker,
};
use unbait_index::{IndexClient, OutputDocument};

use crate::cancel::CancelFlag;
use crate::error::PipelineError;
use crate::phase::{PhaseTracker, RunPhase};
use crate::processor::{ArticleOutcome, ArticleProcessor};
use crate::stats::RunStats;

/// Final accounting for one run. A cancelled run still reports real counts.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: RunStats,
    pub batches_submitted: usize,
    pub cancelled: bool,
    pub duration_secs: f64,
}

/// Owns every pipeline component for the lifetime of the process and drives
/// complete runs. Constructed once from config; all collaborators are
/// dependency-injected so tests can swap them for mocks.
pub struct PipelineRunner {
    config: AppConfig,
    coordinator: Coordinator,
    headline_api: HeadlineApiClient,
    processor: Arc<ArticleProcessor>,
    index: IndexClient,
    /// Single-writer guard: every reliability update funnels through here.
    tracker: Mutex<SourceReliabilityTracker>,
    cancel: CancelFlag,
}

impl PipelineRunner {
    /// Build the full component graph from application config.
    ///
    /// Reads the source registry from `config.sources_path` when present,
    /// falling back to the built-in source set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the registry file is invalid or any HTTP
    /// client cannot be constructed. Missing required configuration has
    /// already aborted in `load_app_config` — the only fatal category.
    pub fn from_config(config: AppConfig) -> Result<Self, PipelineError> {
        let specs = if config.sources_path.exists() {
            load_sources(&config.sources_path)?.sources
        } else {
            tracing::warn!(
                path = %config.sources_path.display(),
                "sources file not found; using built-in source set"
            );
            builtin_specs()
        };
        let sources = build_sources(specs, config.request_timeout_secs, &config.user_agent);
        let coordinator = Coordinator::new(sources);

        let headline_api = HeadlineApiClient::new(
            &config.news_api_key,
            config.request_timeout_secs,
            &config.user_agent,
        )?;

        let sentiment = Arc::new(SentimentClient::new(
            config.sentiment_endpoint.clone(),
            config.sentiment_key.clone(),
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        let extractor = Arc::new(ExtractorClient::new(
            config.extractor_endpoint.clone(),
            config.extractor_key.clone(),
            config.request_timeout_secs,
            &config.user_agent,
        )?);
        let detector = ClickbaitDetector::new(Arc::clone(&sentiment), extractor);
        let rewriter = RewriterClient::new(
            &config.rewriter_endpoint,
            &config.rewriter_key,
            &config.rewriter_deployment,
            config.request_timeout_secs,
            &config.user_agent,
        )?;
        let processor = Arc::new(ArticleProcessor::new(sentiment, detector, rewriter));

        let index = IndexClient::new(
            &config.search_endpoint,
            &config.search_key,
            &config.search_index,
            config.request_timeout_secs,
            &config.user_agent,
        )?;

        let store = JsonFileStore::new(&config.reliability_path);
        let tracker = Mutex::new(SourceReliabilityTracker::new(Box::new(store)));

        Ok(Self {
            config,
            coordinator,
            headline_api,
            processor,
            index,
            tracker,
            cancel: CancelFlag::new(),
        })
    }

    /// Assemble a runner from pre-built components (used by tests).
    #[must_use]
    pub fn new(
        config: AppConfig,
        coordinator: Coordinator,
        headline_api: HeadlineApiClient,
        processor: ArticleProcessor,
        index: IndexClient,
        tracker: SourceReliabilityTracker,
    ) -> Self {
        Self {
            config,
            coordinator,
            headline_api,
            processor: Arc::new(processor),
            index,
            tracker: Mutex::new(tracker),
            cancel: CancelFlag::new(),
        }
    }

    /// Handle for stopping the run between batches.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Current reliability report from the tracker.
    pub async fn reliability_report(&self) -> ReliabilityReport {
        self.tracker.lock().await.report()
    }

    /// Execute one full pipeline pass.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only for phase-ordering bugs; every remote
    /// or per-article failure is counted and the run continues.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let mut stats = RunStats::default();
        let mut phase = PhaseTracker::new();

        tracing::info!(
            mode = %self.config.source_mode,
            total_articles = self.config.total_articles,
            batch_size = self.config.batch_size,
            "starting pipeline run"
        );

        let articles = self.fetch_articles(&mut stats).await;
        stats.articles_fetched = articles.len();

        phase.advance(RunPhase::Validating)?;
        let mut validator = ContentValidator::new(
            self.config.max_age_days,
            self.config.title_similarity_threshold,
        );
        let (mut valid, _rejections) = validator.validate_articles(articles);
        valid.truncate(self.config.total_articles);

        phase.advance(RunPhase::Processing)?;
        let (batches_submitted, cancelled) = if valid.is_empty() {
            tracing::warn!("no articles survived validation; nothing to process");
            (0, false)
        } else {
            self.process_batches(&valid, &mut stats).await
        };

        phase.advance(RunPhase::Done)?;

        if let Err(e) = self.tracker.lock().await.flush() {
            tracing::warn!(error = %e, "final reliability flush failed");
        }

        let duration_secs = started.elapsed().as_secs_f64();
        stats.log_summary(duration_secs);

        Ok(RunSummary {
            stats,
            batches_submitted,
            cancelled,
            duration_secs,
        })
    }

    async fn fetch_articles(&self, stats: &mut RunStats) -> Vec<NormalizedArticle> {
        match self.config.source_mode {
            SourceMode::Rss => self.fetch_rss(self.config.total_articles).await,
            SourceMode::NewsApi => {
                self.fetch_headline_api(self.config.total_articles, stats)
                    .await
            }
            SourceMode::Mixed => {
                let api_count = self.config.total_articles / 2;
                let rss_count = self.config.total_articles - api_count;
                tracing::info!(api_count, rss_count, "mixed source mode");

                let mut articles = self.fetch_headline_api(api_count, stats).await;
                articles.extend(self.fetch_rss(rss_count).await);

                // Interleave the two producers rather than processing one
                // block after the other.
                use rand::seq::SliceRandom;
                articles.shuffle(&mut rand::rng());
                articles
            }
        }
    }

    async fn fetch_rss(&self, target: usize) -> Vec<NormalizedArticle> {
        let source_count = self.coordinator.available_sources().len().max(1);
        // Slight excess per source to survive deduplication.
        let per_source = target / source_count + 5;
        self.coordinator.fetch_flat(per_source).await
    }

    async fn fetch_headline_api(&self, target: usize, stats: &mut RunStats) -> Vec<NormalizedArticle> {
        let outcome = self
            .headline_api
            .fetch_mix(&TopicSpec::default_mix(), target)
            .await;
        stats.api_calls += outcome.api_calls;
        stats.api_errors += outcome.api_errors;
        outcome.articles
    }

    async fn process_batches(
        &self,
        articles: &[NormalizedArticle],
        stats: &mut RunStats,
    ) -> (usize, bool) {
        let batch_size = self.config.batch_size.max(1);
        let total = articles.len();
        let total_batches = total.div_ceil(batch_size);
        let started = Instant::now();

        let mut batches_submitted = 0usize;
        let mut cancelled = false;

        for (batch_index, batch) in articles.chunks(batch_size).enumerate() {
            let batch_num = batch_index + 1;

            if self.cancel.is_cancelled() {
                tracing::warn!(
                    batch = batch_num,
                    total_batches,
                    "run cancelled; already-submitted batches remain submitted"
                );
                cancelled = true;
                break;
            }

            tracing::info!(
                batch = batch_num,
                total_batches,
                size = batch.len(),
                "processing batch"
            );

            // Score concurrently up to the worker bound; `buffered` keeps
            // results in input order so batch grouping stays stable.
            let outcomes: Vec<ArticleOutcome> = stream::iter(batch)
                .map(|article| self.processor.process(article))
                .buffered(self.config.scoring_concurrency.max(1))
                .collect()
                .await;

            let docs = self.settle_outcomes(outcomes, stats).await;

            if !docs.is_empty() {
                self.submit_batch(batch_num, &docs, stats, &mut batches_submitted)
                    .await;
            }

            self.log_progress(batch_num, batch_size, total, &started);

            if batch_num < total_batches && self.config.batch_delay_secs > 0 {
                tracing::debug!(
                    delay_secs = self.config.batch_delay_secs,
                    "pausing before next batch"
                );
                tokio::time::sleep(Duration::from_secs(self.config.batch_delay_secs)).await;
            }
        }

        (batches_submitted, cancelled)
    }

    /// The single serialization point: reliability updates and document
    /// collection happen here, in batch order, under the tracker lock.
    async fn settle_outcomes(
        &self,
        outcomes: Vec<ArticleOutcome>,
        stats: &mut RunStats,
    ) -> Vec<OutputDocument> {
        let mut docs = Vec::new();
        let mut tracker = self.tracker.lock().await;

        for outcome in outcomes {
            match outcome {
                ArticleOutcome::Processed(processed) => {
                    tracker.record_outcome(
                        &processed.source,
                        processed.clickbait_score,
                        processed.is_clickbait,
                    );
                    stats.articles_processed += 1;
                    stats.api_calls += 2;
                    if processed.rewritten {
                        stats.api_calls += 1;
                        stats.rewrites_successful += 1;
                    } else {
                        stats.articles_skipped += 1;
                    }
                    docs.push(processed.document);
                }
                ArticleOutcome::RewriteFailed {
                    source,
                    clickbait_score,
                    is_clickbait,
                } => {
                    tracker.record_outcome(&source, clickbait_score, is_clickbait);
                    stats.api_calls += 3;
                    stats.api_errors += 1;
                    stats.rewrites_failed += 1;
                }
            }
        }

        docs
    }

    async fn submit_batch(
        &self,
        batch_num: usize,
        docs: &[OutputDocument],
        stats: &mut RunStats,
        batches_submitted: &mut usize,
    ) {
        tracing::info!(batch = batch_num, documents = docs.len(), "uploading batch");
        stats.api_calls += 1;

        match self.index.upload_batch(docs).await {
            Ok(outcome) => {
                stats.uploads_successful += outcome.successful;
                stats.uploads_failed += outcome.failed;
                *batches_submitted += 1;
                if outcome.failed > 0 {
                    tracing::warn!(
                        batch = batch_num,
                        successful = outcome.successful,
                        failed = outcome.failed,
                        "batch accepted with per-document failures"
                    );
                } else {
                    tracing::info!(batch = batch_num, documents = outcome.successful, "batch uploaded");
                }
            }
            Err(e) => {
                stats.uploads_failed += docs.len();
                stats.api_errors += 1;
                tracing::error!(batch = batch_num, error = %e, "batch upload failed; continuing");
            }
        }
    }

    /// Advisory progress/ETA log; never gates execution.
    fn log_progress(&self, batch_num: usize, batch_size: usize, total: usize, started: &Instant) {
        let processed = (batch_num * batch_size).min(total);
        if processed == 0 || processed >= total {
            return;
        }
        let elapsed = started.elapsed().as_secs_f64();
        #[allow(clippy::cast_precision_loss)]
        let avg_per_article = elapsed / processed as f64;
        #[allow(clippy::cast_precision_loss)]
        let eta_minutes = avg_per_article * (total - processed) as f64 / 60.0;
        #[allow(clippy::cast_precision_loss)]
        let pct = processed as f64 / total as f64 * 100.0;
        tracing::info!(
            progress = format!("{processed}/{total}"),
            pct = format!("{pct:.1}%"),
            eta_minutes = format!("{eta_minutes:.1}"),
            "run progress"
        );
    }
}
