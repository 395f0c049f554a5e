//! Run statistics.

/// Counters accumulated over one pipeline run and reported in the end-of-run
/// summary. Per-item failures only ever surface here, never as run aborts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub articles_fetched: usize,
    pub articles_processed: usize,
    pub articles_skipped: usize,
    pub rewrites_successful: usize,
    pub rewrites_failed: usize,
    pub api_calls: usize,
    pub api_errors: usize,
    pub uploads_successful: usize,
    pub uploads_failed: usize,
}

impl RunStats {
    /// Share of processed articles that were successfully rewritten, as a
    /// percentage. Zero when nothing was processed.
    #[must_use]
    pub fn rewrite_success_rate(&self) -> f64 {
        if self.articles_processed == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.rewrites_successful as f64 / self.articles_processed as f64 * 100.0;
        rate
    }

    /// Share of API calls that errored, as a percentage.
    #[must_use]
    pub fn api_error_rate(&self) -> f64 {
        if self.api_calls == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.api_errors as f64 / self.api_calls as f64 * 100.0;
        rate
    }

    /// Log the end-of-run summary.
    pub fn log_summary(&self, duration_secs: f64) {
        tracing::info!(
            duration_secs = format!("{duration_secs:.1}"),
            articles_fetched = self.articles_fetched,
            articles_processed = self.articles_processed,
            articles_skipped = self.articles_skipped,
            rewrites_successful = self.rewrites_successful,
            rewrites_failed = self.rewrites_failed,
            api_calls = self.api_calls,
            api_errors = self.api_errors,
            uploads_successful = self.uploads_successful,
            uploads_failed = self.uploads_failed,
            rewrite_success_rate = format!("{:.1}%", self.rewrite_success_rate()),
            api_error_rate = format!("{:.1}%", self.api_error_rate()),
            "run statistics summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_are_zero_when_nothing_happened() {
        let stats = RunStats::default();
        assert!(stats.rewrite_success_rate().abs() < f64::EPSILON);
        assert!(stats.api_error_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn rewrite_success_rate_over_processed() {
        let stats = RunStats {
            articles_processed: 40,
            rewrites_successful: 10,
            ..RunStats::default()
        };
        assert!((stats.rewrite_success_rate() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn api_error_rate_over_calls() {
        let stats = RunStats {
            api_calls: 200,
            api_errors: 5,
            ..RunStats::default()
        };
        assert!((stats.api_error_rate() - 2.5).abs() < 1e-9);
    }
}
