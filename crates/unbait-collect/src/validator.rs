//! Stateful quality gate: field completeness, dedup, and freshness.

use std::collections::HashMap;
use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use unbait_core::NormalizedArticle;

use crate::similarity::similarity_ratio;

/// Why an article was rejected by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    MissingField,
    DuplicateUrl,
    DuplicateTitle,
    TooOld,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingField => write!(f, "missing_field"),
            RejectReason::DuplicateUrl => write!(f, "duplicate_url"),
            RejectReason::DuplicateTitle => write!(f, "duplicate_title"),
            RejectReason::TooOld => write!(f, "too_old"),
        }
    }
}

/// Validation counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub checked: usize,
    pub dup_url: usize,
    pub dup_title: usize,
    pub missing_fields: usize,
    pub too_old: usize,
    pub valid: usize,
}

/// Ordered, single-threaded gate over a sequence of articles.
///
/// Dedup state is per-run: create one validator per pipeline pass, or call
/// [`ContentValidator::reset`] between independent runs. The title check is a
/// deliberate O(n²) scan against every previously accepted title — exhaustive
/// comparison is preferred over throughput at the hundreds-per-run volumes
/// this pipeline sees.
pub struct ContentValidator {
    max_age: Duration,
    title_similarity_threshold: f64,
    seen_urls: HashSet<String>,
    seen_titles: Vec<String>,
    stats: ValidationStats,
}

impl ContentValidator {
    #[must_use]
    pub fn new(max_age_days: i64, title_similarity_threshold: f64) -> Self {
        Self {
            max_age: Duration::days(max_age_days),
            title_similarity_threshold,
            seen_urls: HashSet::new(),
            seen_titles: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Validate one article against the gate, updating dedup state when it is
    /// accepted. Checks run in a fixed order: required fields, URL dedup,
    /// title similarity, freshness.
    pub fn validate(&mut self, article: &NormalizedArticle) -> Result<(), RejectReason> {
        self.stats.checked += 1;

        if article.title.trim().is_empty()
            || article.url.trim().is_empty()
            || article.published_at.trim().is_empty()
        {
            self.stats.missing_fields += 1;
            return Err(RejectReason::MissingField);
        }

        let url = article.url.trim().to_string();
        if self.seen_urls.contains(&url) {
            self.stats.dup_url += 1;
            return Err(RejectReason::DuplicateUrl);
        }

        let title = article.title.trim().to_string();
        for seen in &self.seen_titles {
            let similarity = similarity_ratio(&title, seen);
            if similarity >= self.title_similarity_threshold {
                tracing::debug!(
                    title = %title,
                    similarity = format!("{similarity:.2}"),
                    "rejecting near-duplicate title"
                );
                self.stats.dup_title += 1;
                return Err(RejectReason::DuplicateTitle);
            }
        }

        match DateTime::parse_from_rfc3339(article.published_at.trim()) {
            Ok(published) => {
                let age = Utc::now().signed_duration_since(published.with_timezone(&Utc));
                if age > self.max_age {
                    self.stats.too_old += 1;
                    return Err(RejectReason::TooOld);
                }
            }
            Err(e) => {
                // Lenient on ambiguous input: pass unparseable dates through.
                tracing::warn!(
                    title = %title,
                    published_at = %article.published_at,
                    error = %e,
                    "could not parse published date; accepting article"
                );
            }
        }

        self.seen_urls.insert(url);
        self.seen_titles.push(title);
        self.stats.valid += 1;
        Ok(())
    }

    /// Validate a sequence, returning survivors in input order plus a
    /// rejection-reason histogram.
    pub fn validate_articles(
        &mut self,
        articles: Vec<NormalizedArticle>,
    ) -> (Vec<NormalizedArticle>, HashMap<RejectReason, usize>) {
        let total = articles.len();
        let mut valid = Vec::new();
        let mut rejections: HashMap<RejectReason, usize> = HashMap::new();

        for article in articles {
            match self.validate(&article) {
                Ok(()) => valid.push(article),
                Err(reason) => {
                    *rejections.entry(reason).or_insert(0) += 1;
                }
            }
        }

        if !rejections.is_empty() {
            for (reason, count) in &rejections {
                tracing::info!(reason = %reason, count, "validation rejections");
            }
        }
        tracing::info!(valid = valid.len(), total, "validation complete");

        (valid, rejections)
    }

    #[must_use]
    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    /// Clear dedup state and counters. State is never shared across runs.
    pub fn reset(&mut self) {
        self.seen_urls.clear();
        self.seen_titles.clear();
        self.stats = ValidationStats::default();
        tracing::info!("validator state reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, url: &str, published_at: &str) -> NormalizedArticle {
        NormalizedArticle {
            title: title.to_string(),
            url: url.to_string(),
            content: String::new(),
            source: "Test Wire".to_string(),
            published_at: published_at.to_string(),
            author: String::new(),
            image_url: String::new(),
        }
    }

    fn recent() -> String {
        (Utc::now() - Duration::hours(6)).to_rfc3339()
    }

    fn validator() -> ContentValidator {
        ContentValidator::new(7, 0.85)
    }

    #[test]
    fn accepts_complete_fresh_article() {
        let mut v = validator();
        let result = v.validate(&article("A fresh headline", "https://example.com/a", &recent()));
        assert!(result.is_ok());
        assert_eq!(v.stats().valid, 1);
    }

    #[test]
    fn rejects_missing_title() {
        let mut v = validator();
        let result = v.validate(&article("", "https://example.com/a", &recent()));
        assert_eq!(result.unwrap_err(), RejectReason::MissingField);
        assert_eq!(v.stats().missing_fields, 1);
    }

    #[test]
    fn rejects_missing_published_date() {
        let mut v = validator();
        let result = v.validate(&article("Headline", "https://example.com/a", ""));
        assert_eq!(result.unwrap_err(), RejectReason::MissingField);
    }

    #[test]
    fn second_occurrence_of_url_is_always_duplicate() {
        let mut v = validator();
        let date = recent();
        v.validate(&article("First headline", "https://example.com/a", &date))
            .unwrap();
        // Same URL, entirely different title: still rejected on URL.
        let result = v.validate(&article(
            "Completely unrelated other words",
            "https://example.com/a",
            &date,
        ));
        assert_eq!(result.unwrap_err(), RejectReason::DuplicateUrl);
        assert_eq!(v.stats().dup_url, 1);
    }

    #[test]
    fn url_comparison_trims_whitespace() {
        let mut v = validator();
        let date = recent();
        v.validate(&article("First", "https://example.com/a", &date))
            .unwrap();
        let result = v.validate(&article("Entirely new words", "  https://example.com/a  ", &date));
        assert_eq!(result.unwrap_err(), RejectReason::DuplicateUrl);
    }

    #[test]
    fn near_identical_title_rejected_against_any_prior_title() {
        let mut v = validator();
        let date = recent();
        v.validate(&article(
            "Government Announces New Climate Policy for 2026",
            "https://example.com/a",
            &date,
        ))
        .unwrap();
        v.validate(&article(
            "Local Team Wins Championship Final",
            "https://example.com/b",
            &date,
        ))
        .unwrap();
        // Similar to the first accepted title, not the most recent one.
        let result = v.validate(&article(
            "Government announces new climate policy for 2026.",
            "https://example.com/c",
            &date,
        ));
        assert_eq!(result.unwrap_err(), RejectReason::DuplicateTitle);
        assert_eq!(v.stats().dup_title, 1);
    }

    #[test]
    fn rejects_article_older_than_max_age() {
        let mut v = validator();
        let stale = (Utc::now() - Duration::days(10)).to_rfc3339();
        let result = v.validate(&article("Old news", "https://example.com/old", &stale));
        assert_eq!(result.unwrap_err(), RejectReason::TooOld);
        assert_eq!(v.stats().too_old, 1);
    }

    #[test]
    fn unparseable_date_passes_through() {
        let mut v = validator();
        let result = v.validate(&article(
            "Undated story",
            "https://example.com/undated",
            "sometime last week",
        ));
        assert!(result.is_ok(), "lenient policy should accept unparseable dates");
        assert_eq!(v.stats().valid, 1);
    }

    #[test]
    fn validate_articles_keeps_input_order_and_reports_reasons() {
        let mut v = validator();
        let date = recent();
        let stale = (Utc::now() - Duration::days(30)).to_rfc3339();
        let input = vec![
            article("First story", "https://example.com/1", &date),
            article("First story", "https://example.com/1", &date),
            article("Second story entirely", "https://example.com/2", &date),
            article("Stale story", "https://example.com/3", &stale),
            article("", "https://example.com/4", &date),
        ];

        let (valid, rejections) = v.validate_articles(input);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].url, "https://example.com/1");
        assert_eq!(valid[1].url, "https://example.com/2");
        assert_eq!(rejections[&RejectReason::DuplicateUrl], 1);
        assert_eq!(rejections[&RejectReason::TooOld], 1);
        assert_eq!(rejections[&RejectReason::MissingField], 1);
    }

    #[test]
    fn accepted_articles_always_have_identity_fields() {
        let mut v = validator();
        let date = recent();
        let input = vec![
            article("Real story", "https://example.com/1", &date),
            article(" ", "https://example.com/2", &date),
            article("Other", "", &date),
        ];
        let (valid, _) = v.validate_articles(input);
        assert!(valid
            .iter()
            .all(|a| !a.title.trim().is_empty() && !a.url.trim().is_empty()));
    }

    #[test]
    fn reset_clears_dedup_state() {
        let mut v = validator();
        let date = recent();
        v.validate(&article("Story", "https://example.com/1", &date))
            .unwrap();
        v.reset();
        assert_eq!(*v.stats(), ValidationStats::default());
        // Previously seen URL is accepted again after reset.
        assert!(v
            .validate(&article("Story", "https://example.com/1", &date))
            .is_ok());
    }
}
