//! Fan-out across all registered sources with per-source failure isolation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::Mutex;

use futures::stream::{self, StreamExt};

use unbait_core::NormalizedArticle;

use crate::source::NewsSource;

/// Cumulative per-source counters, kept across fetches until reset.
#[derive(Debug, Clone, Default)]
pub struct SourceCounters {
    pub fetched: usize,
    pub errors: usize,
    pub last_fetch_count: usize,
}

/// Coordinator-lifetime statistics.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStats {
    pub total_fetched: usize,
    pub total_errors: usize,
    pub per_source: HashMap<String, SourceCounters>,
}

/// Invokes every registered source, isolates per-source failures, and merges
/// results tagged with source identity. No filtering or validation happens
/// here — that is the content validator's job.
pub struct Coordinator {
    sources: Vec<Arc<dyn NewsSource>>,
    stats: Mutex<CoordinatorStats>,
}

impl Coordinator {
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn NewsSource>>) -> Self {
        let mut stats = CoordinatorStats::default();
        for source in &sources {
            stats
                .per_source
                .insert(source.key().to_string(), SourceCounters::default());
        }
        tracing::info!(sources = sources.len(), "coordinator initialised");
        Self {
            sources,
            stats: Mutex::new(stats),
        }
    }

    /// Fetch from all sources concurrently, returning a map of source key to
    /// articles. One source's failure never prevents the others from running:
    /// a failing source contributes an empty list and an error counter bump.
    pub async fn fetch_all(
        &self,
        per_source_limit: usize,
    ) -> HashMap<String, Vec<NormalizedArticle>> {
        let concurrency = self.sources.len().max(1);

        let results: Vec<(String, String, Result<Vec<NormalizedArticle>, _>)> =
            stream::iter(self.sources.iter().cloned())
                .map(|source| async move {
                    tracing::info!(source = %source.key(), "fetching");
                    if !source.check_access_policy().await {
                        tracing::warn!(
                            source = %source.key(),
                            "source access policy discourages fetching; continuing anyway"
                        );
                    }
                    let result = source.fetch(per_source_limit).await;
                    (
                        source.key().to_string(),
                        source.name().to_string(),
                        result,
                    )
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        let mut merged = HashMap::new();
        let mut stats = self.stats.lock().expect("coordinator stats poisoned");

        for (key, name, result) in results {
            let counters = stats.per_source.entry(key.clone()).or_default();
            match result {
                Ok(mut articles) => {
                    // Tag provenance for producers that left the source blank.
                    for article in &mut articles {
                        if article.source.trim().is_empty() {
                            article.source = name.clone();
                        }
                    }
                    let count = articles.len();
                    counters.fetched += count;
                    counters.last_fetch_count = count;
                    stats.total_fetched += count;
                    tracing::info!(source = %key, count, "fetch succeeded");
                    merged.insert(key, articles);
                }
                Err(e) => {
                    counters.errors += 1;
                    counters.last_fetch_count = 0;
                    stats.total_errors += 1;
                    tracing::warn!(source = %key, error = %e, "fetch failed");
                    merged.insert(key, Vec::new());
                }
            }
        }

        merged
    }

    /// Fetch from all sources and flatten into one sequence.
    pub async fn fetch_flat(&self, per_source_limit: usize) -> Vec<NormalizedArticle> {
        let by_source = self.fetch_all(per_source_limit).await;
        let mut flat: Vec<NormalizedArticle> = Vec::new();
        // BTreeMap iteration keeps the merge order stable across runs.
        let ordered: BTreeMap<String, Vec<NormalizedArticle>> = by_source.into_iter().collect();
        for (_, articles) in ordered {
            flat.extend(articles);
        }
        tracing::info!(count = flat.len(), "collected articles from all sources");
        flat
    }

    /// Registered sources as `key -> display name`.
    #[must_use]
    pub fn available_sources(&self) -> BTreeMap<String, String> {
        self.sources
            .iter()
            .map(|s| (s.key().to_string(), s.name().to_string()))
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        self.stats.lock().expect("coordinator stats poisoned").clone()
    }

    pub fn reset_stats(&self) {
        let mut stats = self.stats.lock().expect("coordinator stats poisoned");
        stats.total_fetched = 0;
        stats.total_errors = 0;
        for counters in stats.per_source.values_mut() {
            *counters = SourceCounters::default();
        }
        tracing::info!("coordinator statistics reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::CollectError;

    struct StubSource {
        key: &'static str,
        name: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl NewsSource for StubSource {
        fn key(&self) -> &str {
            self.key
        }

        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(
            &self,
            max_articles: usize,
        ) -> Result<Vec<NormalizedArticle>, CollectError> {
            if self.fail {
                return Err(CollectError::UnexpectedStatus {
                    status: 503,
                    url: format!("https://{}.example.com", self.key),
                });
            }
            Ok((0..max_articles.min(3))
                .map(|i| NormalizedArticle {
                    title: format!("{} headline {i}", self.name),
                    url: format!("https://{}.example.com/{i}", self.key),
                    content: String::new(),
                    source: String::new(),
                    published_at: "2026-08-04T00:00:00+00:00".to_string(),
                    author: String::new(),
                    image_url: String::new(),
                })
                .collect())
        }

        async fn check_access_policy(&self) -> bool {
            true
        }
    }

    fn coordinator(fail_second: bool) -> Coordinator {
        Coordinator::new(vec![
            Arc::new(StubSource {
                key: "alpha",
                name: "Alpha Wire",
                fail: false,
            }),
            Arc::new(StubSource {
                key: "beta",
                name: "Beta Press",
                fail: fail_second,
            }),
        ])
    }

    #[tokio::test]
    async fn fetch_all_merges_by_source_key() {
        let coordinator = coordinator(false);
        let all = coordinator.fetch_all(3).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all["alpha"].len(), 3);
        assert_eq!(all["beta"].len(), 3);
    }

    #[tokio::test]
    async fn one_failing_source_does_not_block_others() {
        let coordinator = coordinator(true);
        let all = coordinator.fetch_all(3).await;
        assert_eq!(all["alpha"].len(), 3);
        assert!(all["beta"].is_empty());

        let stats = coordinator.stats();
        assert_eq!(stats.total_fetched, 3);
        assert_eq!(stats.total_errors, 1);
        assert_eq!(stats.per_source["beta"].errors, 1);
        assert_eq!(stats.per_source["alpha"].fetched, 3);
    }

    #[tokio::test]
    async fn fetch_flat_tags_provenance() {
        let coordinator = coordinator(false);
        let flat = coordinator.fetch_flat(2).await;
        assert_eq!(flat.len(), 4);
        assert!(flat.iter().all(|a| !a.source.is_empty()));
        assert!(flat.iter().any(|a| a.source == "Alpha Wire"));
        assert!(flat.iter().any(|a| a.source == "Beta Press"));
    }

    #[tokio::test]
    async fn stats_accumulate_and_reset() {
        let coordinator = coordinator(false);
        coordinator.fetch_flat(3).await;
        coordinator.fetch_flat(3).await;
        assert_eq!(coordinator.stats().total_fetched, 12);
        assert_eq!(coordinator.stats().per_source["alpha"].last_fetch_count, 3);

        coordinator.reset_stats();
        let stats = coordinator.stats();
        assert_eq!(stats.total_fetched, 0);
        assert_eq!(stats.per_source["alpha"].fetched, 0);
    }

    #[tokio::test]
    async fn available_sources_lists_display_names() {
        let coordinator = coordinator(false);
        let sources = coordinator.available_sources();
        assert_eq!(sources["alpha"], "Alpha Wire");
        assert_eq!(sources["beta"], "Beta Press");
    }
}
