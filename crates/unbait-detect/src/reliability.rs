//! Long-running per-source reliability statistics.
//!
//! Each source accumulates article counts and clickbait scores across runs.
//! The backing store is flushed every 10th update to the same source — a
//! deliberate durability/latency tradeoff: a crash loses at most 9 updates
//! per source and never corrupts the in-memory record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DetectError;

/// How often (in updates per source) the store is flushed.
const FLUSH_EVERY: u64 = 10;

/// Minimum articles before a source appears in the report.
const REPORT_MIN_ARTICLES: u64 = 5;

/// Minimum articles before a rating is computed.
const RATING_MIN_ARTICLES: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReliabilityRating {
    Unknown,
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl std::fmt::Display for ReliabilityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReliabilityRating::Unknown => write!(f, "unknown"),
            ReliabilityRating::Excellent => write!(f, "excellent"),
            ReliabilityRating::Good => write!(f, "good"),
            ReliabilityRating::Moderate => write!(f, "moderate"),
            ReliabilityRating::Poor => write!(f, "poor"),
        }
    }
}

/// Running statistics for one source. `average_score` is always recomputed
/// from `total_score_sum / total_articles`, never drifted independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReliabilityRecord {
    pub total_articles: u64,
    pub clickbait_count: u64,
    pub total_score_sum: u64,
    pub average_score: f64,
    pub reliability_rating: ReliabilityRating,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for SourceReliabilityRecord {
    fn default() -> Self {
        Self {
            total_articles: 0,
            clickbait_count: 0,
            total_score_sum: 0,
            average_score: 0.0,
            reliability_rating: ReliabilityRating::Unknown,
            last_updated: None,
        }
    }
}

/// Durable key-value store for the reliability record set.
pub trait StatsStore: Send + Sync {
    /// Load all records. A missing backing file yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError`] on I/O or parse failure.
    fn load(&self) -> Result<HashMap<String, SourceReliabilityRecord>, DetectError>;

    /// Persist all records.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError`] on I/O or serialization failure.
    fn save(&self, records: &HashMap<String, SourceReliabilityRecord>) -> Result<(), DetectError>;
}

/// JSON-file implementation of [`StatsStore`].
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl StatsStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, SourceReliabilityRecord>, DetectError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| DetectError::StoreIo {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, records: &HashMap<String, SourceReliabilityRecord>) -> Result<(), DetectError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DetectError::StoreIo {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, content).map_err(|e| DetectError::StoreIo {
            path: self.path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "reliability records saved");
        Ok(())
    }
}

/// One row of the reliability report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub total_articles: u64,
    pub clickbait_count: u64,
    pub clickbait_percentage: f64,
    pub average_score: f64,
    pub reliability_rating: ReliabilityRating,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Reliability report across all sources with enough history.
#[derive(Debug, Clone, Serialize)]
pub struct ReliabilityReport {
    pub total_sources: usize,
    pub sources: Vec<ReportEntry>,
    pub generated_at: DateTime<Utc>,
    pub summary: HashMap<ReliabilityRating, usize>,
}

/// Tracks source reliability over time. Not internally synchronized: callers
/// funnel all updates through a single writer.
pub struct SourceReliabilityTracker {
    store: Box<dyn StatsStore>,
    records: HashMap<String, SourceReliabilityRecord>,
}

impl SourceReliabilityTracker {
    /// Creates a tracker, loading existing records from the store. A store
    /// that fails to load starts the tracker empty with a warning — history
    /// is valuable but never required.
    #[must_use]
    pub fn new(store: Box<dyn StatsStore>) -> Self {
        let records = match store.load() {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "could not load source reliability records");
                HashMap::new()
            }
        };
        tracing::info!(sources = records.len(), "reliability tracker initialised");
        Self { store, records }
    }

    /// Record one scored article for a source.
    pub fn record_outcome(&mut self, source: &str, score: u32, was_clickbait: bool) {
        let record = self.records.entry(source.to_string()).or_default();

        record.total_articles += 1;
        if was_clickbait {
            record.clickbait_count += 1;
        }
        record.total_score_sum += u64::from(score);
        #[allow(clippy::cast_precision_loss)]
        {
            record.average_score = record.total_score_sum as f64 / record.total_articles as f64;
        }
        record.last_updated = Some(Utc::now());

        if record.total_articles >= RATING_MIN_ARTICLES {
            record.reliability_rating = rating_for(record.average_score);
        }

        tracing::debug!(
            source,
            average_score = format!("{:.1}", record.average_score),
            rating = %record.reliability_rating,
            "updated source reliability"
        );

        if record.total_articles % FLUSH_EVERY == 0 {
            if let Err(e) = self.store.save(&self.records) {
                tracing::error!(error = %e, "could not save source reliability records");
            }
        }
    }

    /// Persist all records immediately, regardless of the periodic schedule.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError`] if the store rejects the write.
    pub fn flush(&self) -> Result<(), DetectError> {
        self.store.save(&self.records)
    }

    #[must_use]
    pub fn record_for(&self, source: &str) -> Option<&SourceReliabilityRecord> {
        self.records.get(source)
    }

    /// Report over sources with at least five articles, most reliable
    /// (lowest average score) first.
    #[must_use]
    pub fn report(&self) -> ReliabilityReport {
        let mut entries: Vec<ReportEntry> = self
            .records
            .iter()
            .filter(|(_, r)| r.total_articles >= REPORT_MIN_ARTICLES)
            .map(|(name, r)| {
                #[allow(clippy::cast_precision_loss)]
                let clickbait_percentage =
                    r.clickbait_count as f64 / r.total_articles as f64 * 100.0;
                ReportEntry {
                    name: name.clone(),
                    total_articles: r.total_articles,
                    clickbait_count: r.clickbait_count,
                    clickbait_percentage,
                    average_score: r.average_score,
                    reliability_rating: r.reliability_rating,
                    last_updated: r.last_updated,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            a.average_score
                .partial_cmp(&b.average_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut summary: HashMap<ReliabilityRating, usize> = HashMap::new();
        for entry in &entries {
            *summary.entry(entry.reliability_rating).or_insert(0) += 1;
        }

        ReliabilityReport {
            total_sources: entries.len(),
            sources: entries,
            generated_at: Utc::now(),
            summary,
        }
    }
}

fn rating_for(average_score: f64) -> ReliabilityRating {
    if average_score < 30.0 {
        ReliabilityRating::Excellent
    } else if average_score < 50.0 {
        ReliabilityRating::Good
    } else if average_score < 70.0 {
        ReliabilityRating::Moderate
    } else {
        ReliabilityRating::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory store that counts saves.
    struct CountingStore {
        saves: Arc<AtomicUsize>,
    }

    impl StatsStore for CountingStore {
        fn load(&self) -> Result<HashMap<String, SourceReliabilityRecord>, DetectError> {
            Ok(HashMap::new())
        }

        fn save(
            &self,
            _records: &HashMap<String, SourceReliabilityRecord>,
        ) -> Result<(), DetectError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn tracker_with_counter() -> (SourceReliabilityTracker, Arc<AtomicUsize>) {
        let saves = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            saves: Arc::clone(&saves),
        };
        (SourceReliabilityTracker::new(Box::new(store)), saves)
    }

    #[test]
    fn average_is_always_sum_over_count() {
        let (mut tracker, _) = tracker_with_counter();
        for score in [12, 47, 83, 5, 99] {
            tracker.record_outcome("Wire", score, score >= 70);
            let record = tracker.record_for("Wire").unwrap();
            #[allow(clippy::cast_precision_loss)]
            let expected = record.total_score_sum as f64 / record.total_articles as f64;
            assert!((record.average_score - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn ten_articles_ten_to_hundred_average_fifty_five_moderate() {
        let (mut tracker, _) = tracker_with_counter();
        for score in (1..=10).map(|i| i * 10) {
            tracker.record_outcome("Source X", score, score >= 70);
        }
        let record = tracker.record_for("Source X").unwrap();
        assert_eq!(record.total_articles, 10);
        assert!((record.average_score - 55.0).abs() < 1e-9);
        assert_eq!(record.reliability_rating, ReliabilityRating::Moderate);
    }

    #[test]
    fn rating_stays_unknown_below_ten_articles() {
        let (mut tracker, _) = tracker_with_counter();
        for _ in 0..9 {
            tracker.record_outcome("Fresh Source", 10, false);
        }
        assert_eq!(
            tracker.record_for("Fresh Source").unwrap().reliability_rating,
            ReliabilityRating::Unknown
        );
        tracker.record_outcome("Fresh Source", 10, false);
        assert_eq!(
            tracker.record_for("Fresh Source").unwrap().reliability_rating,
            ReliabilityRating::Excellent
        );
    }

    #[test]
    fn rating_thresholds() {
        assert_eq!(rating_for(29.9), ReliabilityRating::Excellent);
        assert_eq!(rating_for(30.0), ReliabilityRating::Good);
        assert_eq!(rating_for(49.9), ReliabilityRating::Good);
        assert_eq!(rating_for(50.0), ReliabilityRating::Moderate);
        assert_eq!(rating_for(69.9), ReliabilityRating::Moderate);
        assert_eq!(rating_for(70.0), ReliabilityRating::Poor);
    }

    #[test]
    fn store_flushed_every_tenth_update_per_source() {
        let (mut tracker, saves) = tracker_with_counter();
        for _ in 0..9 {
            tracker.record_outcome("Wire", 20, false);
        }
        assert_eq!(saves.load(Ordering::SeqCst), 0, "no flush before the 10th");
        tracker.record_outcome("Wire", 20, false);
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        for _ in 0..9 {
            tracker.record_outcome("Wire", 20, false);
        }
        assert_eq!(saves.load(Ordering::SeqCst), 1, "no flush between multiples");
        tracker.record_outcome("Wire", 20, false);
        assert_eq!(saves.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clickbait_count_only_increments_when_flagged() {
        let (mut tracker, _) = tracker_with_counter();
        tracker.record_outcome("Wire", 80, true);
        tracker.record_outcome("Wire", 20, false);
        tracker.record_outcome("Wire", 90, true);
        let record = tracker.record_for("Wire").unwrap();
        assert_eq!(record.total_articles, 3);
        assert_eq!(record.clickbait_count, 2);
    }

    #[test]
    fn report_filters_sparse_sources_and_sorts_ascending() {
        let (mut tracker, _) = tracker_with_counter();
        for _ in 0..5 {
            tracker.record_outcome("Tabloid", 80, true);
        }
        for _ in 0..5 {
            tracker.record_outcome("Quality Press", 10, false);
        }
        // Only 2 articles: excluded from the report.
        tracker.record_outcome("Newcomer", 50, false);
        tracker.record_outcome("Newcomer", 50, false);

        let report = tracker.report();
        assert_eq!(report.total_sources, 2);
        assert_eq!(report.sources[0].name, "Quality Press");
        assert_eq!(report.sources[1].name, "Tabloid");
        assert!((report.sources[1].clickbait_percentage - 100.0).abs() < 1e-9);
        assert!((report.sources[0].clickbait_percentage - 0.0).abs() < 1e-9);
    }

    #[test]
    fn json_file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reliability.json");
        let store = JsonFileStore::new(&path);

        assert!(store.load().unwrap().is_empty(), "missing file loads empty");

        let mut records = HashMap::new();
        records.insert(
            "Wire".to_string(),
            SourceReliabilityRecord {
                total_articles: 12,
                clickbait_count: 3,
                total_score_sum: 540,
                average_score: 45.0,
                reliability_rating: ReliabilityRating::Good,
                last_updated: Some(Utc::now()),
            },
        );
        store.save(&records).unwrap();

        let loaded = store.load().unwrap();
        let record = &loaded["Wire"];
        assert_eq!(record.total_articles, 12);
        assert_eq!(record.clickbait_count, 3);
        assert_eq!(record.reliability_rating, ReliabilityRating::Good);
        assert!((record.average_score - 45.0).abs() < 1e-9);
    }

    #[test]
    fn tracker_survives_failing_store_load() {
        struct FailingStore;
        impl StatsStore for FailingStore {
            fn load(&self) -> Result<HashMap<String, SourceReliabilityRecord>, DetectError> {
                Err(DetectError::OperationIncomplete("boom".to_string()))
            }
            fn save(
                &self,
                _records: &HashMap<String, SourceReliabilityRecord>,
            ) -> Result<(), DetectError> {
                Ok(())
            }
        }

        let mut tracker = SourceReliabilityTracker::new(Box::new(FailingStore));
        tracker.record_outcome("Wire", 10, false);
        assert_eq!(tracker.record_for("Wire").unwrap().total_articles, 1);
    }
}
