//! Built-in source registry.

use std::sync::Arc;

use unbait_core::SourceSpec;

use crate::error::CollectError;
use crate::rss::RssSource;
use crate::source::NewsSource;

/// The default source set, used when no `sources.yaml` is configured.
#[must_use]
pub fn builtin_specs() -> Vec<SourceSpec> {
    let spec = |name: &str, feed_url: &str, rate_limit_secs: u64| SourceSpec {
        name: name.to_string(),
        feed_url: feed_url.to_string(),
        rate_limit_secs,
    };

    vec![
        spec("BBC News", "http://feeds.bbci.co.uk/news/rss.xml", 1),
        spec("CNN", "http://rss.cnn.com/rss/edition.rss", 2),
        spec("Reuters", "https://feeds.reuters.com/reuters/topNews", 2),
        spec("The Guardian", "https://www.theguardian.com/uk/rss", 1),
        spec("TechCrunch", "https://techcrunch.com/feed/", 2),
    ]
}

/// Build source adapters from registry specs.
///
/// Specs whose feed URL cannot be parsed are skipped with a warning rather
/// than failing the whole registry.
#[must_use]
pub fn build_sources(
    specs: Vec<SourceSpec>,
    timeout_secs: u64,
    user_agent: &str,
) -> Vec<Arc<dyn NewsSource>> {
    let mut sources: Vec<Arc<dyn NewsSource>> = Vec::with_capacity(specs.len());
    for spec in specs {
        match RssSource::new(spec.clone(), timeout_secs, user_agent) {
            Ok(source) => sources.push(Arc::new(source)),
            Err(CollectError::InvalidFeedUrl { url, reason }) => {
                tracing::warn!(source = %spec.name, url, reason, "skipping source with bad feed URL");
            }
            Err(e) => {
                tracing::warn!(source = %spec.name, error = %e, "skipping source");
            }
        }
    }
    sources
}
